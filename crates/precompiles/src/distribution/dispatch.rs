use super::{ATTRIBUTE_KEY_AMOUNT, ATTRIBUTE_KEY_WITHDRAW_ADDRESS, DistributionContract};
use crate::{
    abi::AbiMethods,
    container::StatefulImpl,
    decoders::{ValueDecoder, ValueDecoders, acc_address_from_bech32, amount_from_coin},
    dispatch::{arg_address, mutate, uint},
    method::ImplMethod,
};
use alloy::{dyn_abi::DynSolValue, primitives::Address};
use std::sync::Arc;

impl StatefulImpl for DistributionContract {
    fn registry_key(&self) -> Address {
        super::DISTRIBUTION_PRECOMPILE_ADDRESS
    }

    fn name(&self) -> &'static str {
        "DistributionContract"
    }

    fn abi_methods(&self) -> &AbiMethods {
        self.abi()
    }

    fn precompile_methods(self: Arc<Self>) -> Vec<ImplMethod> {
        vec![
            ImplMethod::new(&self, "SetWithdrawAddress", "(bool)", |c, ctx, args| {
                mutate(ctx, || {
                    c.set_withdraw_address(ctx.caller, arg_address(args, 0)?)?;
                    Ok(vec![DynSolValue::Bool(true)])
                })
            }),
            ImplMethod::new(&self, "GetWithdrawEnabled", "(bool)", |c, _, _| {
                Ok(vec![DynSolValue::Bool(c.get_withdraw_enabled()?)])
            }),
            ImplMethod::new(&self, "WithdrawDelegatorReward", "(uint256)", |c, ctx, args| {
                mutate(ctx, || {
                    let amount = c.withdraw_delegator_reward(
                        arg_address(args, 0)?,
                        arg_address(args, 1)?,
                    )?;
                    Ok(vec![uint(amount)])
                })
            }),
        ]
    }

    fn custom_value_decoders(&self) -> ValueDecoders {
        [
            (ATTRIBUTE_KEY_WITHDRAW_ADDRESS, acc_address_from_bech32 as ValueDecoder),
            (ATTRIBUTE_KEY_AMOUNT, amount_from_coin),
        ]
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        address::{Bech32Codec, Bech32Config},
        container::Registrable,
        context::CallContext,
        distribution::{
            DISTRIBUTION_PRECOMPILE_ADDRESS, IDistributionModule,
            IDistributionModule::IDistributionModuleCalls,
        },
        registry::PrecompileRegistry,
        test_util::{InMemoryDistribution, assert_full_coverage, check_selector_coverage},
    };
    use alloy::{
        primitives::{U256, address},
        sol_types::{Revert, SolCall, SolError},
    };

    const ALICE: Address = address!("0x1111111111111111111111111111111111111111");
    const VAL_A: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

    fn registry(module: &Arc<InMemoryDistribution>) -> eyre::Result<PrecompileRegistry> {
        let contract =
            DistributionContract::new(module.clone(), module.clone(), Bech32Config::default());
        let mut registry = PrecompileRegistry::new();
        registry.register(Registrable::stateful(contract))?;
        Ok(registry)
    }

    #[test]
    fn test_every_abi_method_is_bound() -> eyre::Result<()> {
        let module = Arc::new(InMemoryDistribution::new(true));
        let registry = registry(&module)?;
        let container = registry
            .get(&DISTRIBUTION_PRECOMPILE_ADDRESS)
            .ok_or_else(|| eyre::eyre!("distribution not registered"))?;

        assert_full_coverage([check_selector_coverage(
            container.as_ref(),
            IDistributionModuleCalls::SELECTORS,
            "IDistributionModule",
            IDistributionModuleCalls::name_by_selector,
        )]);
        Ok(())
    }

    #[test]
    fn test_withdraw_address_decoder_is_exposed() -> eyre::Result<()> {
        let module = Arc::new(InMemoryDistribution::new(true));
        let registry = registry(&module)?;
        let decoders = registry
            .value_decoders(&DISTRIBUTION_PRECOMPILE_ADDRESS)
            .ok_or_else(|| eyre::eyre!("missing decoders"))?;

        let bech32 = Bech32Codec::default().acc_address(ALICE)?;
        assert_eq!(
            decoders.decode(ATTRIBUTE_KEY_WITHDRAW_ADDRESS, &bech32),
            Some(Ok(DynSolValue::Address(ALICE)))
        );
        assert_eq!(
            decoders.decode(ATTRIBUTE_KEY_AMOUNT, "15stake"),
            Some(Ok(uint(U256::from(15))))
        );
        Ok(())
    }

    #[test]
    fn test_withdraw_reward_through_registry() -> eyre::Result<()> {
        let module = Arc::new(InMemoryDistribution::new(true));
        let codec = Bech32Codec::default();
        module.accrue(&codec.acc_address(ALICE)?, &codec.val_address(VAL_A)?, U256::from(9));
        let registry = registry(&module)?;

        let calldata = IDistributionModule::withdrawDelegatorRewardCall {
            delegator: ALICE,
            validator: VAL_A,
        }
        .abi_encode();
        let output = registry
            .run(&DISTRIBUTION_PRECOMPILE_ADDRESS, &calldata, &CallContext::new(ALICE))
            .ok_or_else(|| eyre::eyre!("distribution not registered"))??;
        assert_eq!(
            IDistributionModule::withdrawDelegatorRewardCall::abi_decode_returns(&output.bytes)?,
            U256::from(9)
        );

        // rewards are paid out once
        let output = registry
            .run(&DISTRIBUTION_PRECOMPILE_ADDRESS, &calldata, &CallContext::new(ALICE))
            .ok_or_else(|| eyre::eyre!("distribution not registered"))??;
        assert_eq!(
            IDistributionModule::withdrawDelegatorRewardCall::abi_decode_returns(&output.bytes)?,
            U256::ZERO
        );
        Ok(())
    }

    #[test]
    fn test_disabled_withdraw_address_reverts() -> eyre::Result<()> {
        let module = Arc::new(InMemoryDistribution::new(false));
        let registry = registry(&module)?;
        let calldata = IDistributionModule::setWithdrawAddressCall {
            withdrawAddress: VAL_A,
        }
        .abi_encode();

        let output = registry
            .run(&DISTRIBUTION_PRECOMPILE_ADDRESS, &calldata, &CallContext::new(ALICE))
            .ok_or_else(|| eyre::eyre!("distribution not registered"))??;
        assert!(output.reverted);
        assert_eq!(
            Revert::abi_decode(&output.bytes)?.reason,
            "module error: set withdraw address disabled"
        );
        Ok(())
    }
}
