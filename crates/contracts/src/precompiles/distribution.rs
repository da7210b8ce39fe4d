use alloy::sol;

/// Event attribute key carrying a bech32 withdraw address.
pub const ATTRIBUTE_KEY_WITHDRAW_ADDRESS: &str = "withdraw_address";

sol! {
    /// Distribution module interface.
    #[derive(Debug, PartialEq, Eq)]
    #[sol(abi)]
    interface IDistributionModule {
        /// Set the address that receives the caller's rewards
        function setWithdrawAddress(address withdrawAddress) external returns (bool success);

        /// Whether delegators may set a custom withdraw address
        function getWithdrawEnabled() external view returns (bool enabled);

        /// Withdraw the rewards accrued by `delegator` at `validator`
        function withdrawDelegatorReward(address delegator, address validator) external returns (uint256 amount);
    }
}
