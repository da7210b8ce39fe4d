//! Module precompile ABI bindings and addresses.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod precompiles;

#[cfg(test)]
mod tests {
    use crate::precompiles::{IDistributionModule, IStakingModule};
    use alloy::sol_types::SolCall;

    #[test]
    fn test_abi_lists_every_declared_function() {
        let staking = IStakingModule::abi::functions();
        assert_eq!(staking.len(), 11);
        assert!(staking.contains_key("getValidator"));
        assert!(staking.contains_key("cancelUnbondingDelegation"));

        let distribution = IDistributionModule::abi::functions();
        assert_eq!(distribution.len(), 3);
        assert!(distribution.contains_key("withdrawDelegatorReward"));
    }

    #[test]
    fn test_abi_selectors_match_call_types() {
        let functions = IStakingModule::abi::functions();
        let delegate = &functions["delegate"][0];
        assert_eq!(delegate.selector(), IStakingModule::delegateCall::SELECTOR);
        assert_eq!(delegate.signature(), IStakingModule::delegateCall::SIGNATURE);
    }
}
