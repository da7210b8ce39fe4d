use alloy::sol;

sol! {
    /// Staking module interface.
    ///
    /// Validator and delegator addresses are the 20-byte form of the module's
    /// bech32 account and operator addresses. Write methods act on behalf of
    /// `msg.sender`.
    #[derive(Debug, PartialEq, Eq)]
    #[sol(abi)]
    interface IStakingModule {
        /// Get a single validator by operator address
        function getValidator(address validatorAddress) external view returns (
            address operatorAddress,
            bytes consensusPubkey,
            bool jailed,
            uint8 status,
            uint256 tokens,
            uint256 delegatorShares,
            string moniker
        );

        /// Operator addresses of every known validator
        function getValidators() external view returns (address[] validators);

        /// Operator addresses of the bonded validator set
        function getActiveValidators() external view returns (address[] validators);

        /// Validators a delegator has delegated to
        function getDelegatorValidators(address delegatorAddress) external view returns (address[] validators);

        function getDelegation(address delegatorAddress, address validatorAddress) external view returns (uint256 amount);

        /// Unbonding entries between a delegator and a validator
        function getUnbondingDelegation(address delegatorAddress, address validatorAddress) external view returns (int64[] creationHeights, uint256[] balances);

        /// Redelegation entries from `srcValidator` to `dstValidator`
        function getRedelegations(address delegatorAddress, address srcValidator, address dstValidator) external view returns (int64[] creationHeights, uint256[] balances);

        function delegate(address validatorAddress, uint256 amount) external payable returns (bool success);

        function undelegate(address validatorAddress, uint256 amount) external returns (bool success);

        function beginRedelegate(address srcValidator, address dstValidator, uint256 amount) external returns (bool success);

        /// Cancel an unbonding entry created at `creationHeight`
        function cancelUnbondingDelegation(address validatorAddress, uint256 amount, int64 creationHeight) external returns (bool success);
    }
}
