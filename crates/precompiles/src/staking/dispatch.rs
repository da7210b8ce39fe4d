use super::StakingContract;
use crate::{
    abi::AbiMethods,
    container::StatefulImpl,
    dispatch::{address_array, arg_address, arg_i64, arg_uint, int64, mutate, uint},
    method::ImplMethod,
};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use std::sync::Arc;

const VALIDATOR_TUPLE: &str = "(address,bytes,bool,uint8,uint256,uint256,string)";
const ADDRESSES: &str = "(address[])";
const ENTRIES: &str = "(int64[],uint256[])";
const SUCCESS: &str = "(bool)";

impl StatefulImpl for StakingContract {
    fn registry_key(&self) -> Address {
        super::STAKING_PRECOMPILE_ADDRESS
    }

    fn name(&self) -> &'static str {
        "StakingContract"
    }

    fn abi_methods(&self) -> &AbiMethods {
        self.abi()
    }

    fn precompile_methods(self: Arc<Self>) -> Vec<ImplMethod> {
        vec![
            ImplMethod::new(&self, "GetValidator", VALIDATOR_TUPLE, |c, _, args| {
                let (operator, validator) = c.get_validator(arg_address(args, 0)?)?;
                Ok(vec![
                    DynSolValue::Address(operator),
                    DynSolValue::Bytes(validator.consensus_pubkey.to_vec()),
                    DynSolValue::Bool(validator.jailed),
                    DynSolValue::Uint(U256::from(validator.status as u8), 8),
                    uint(validator.tokens),
                    uint(validator.delegator_shares),
                    DynSolValue::String(validator.moniker),
                ])
            }),
            ImplMethod::new(&self, "GetValidators", ADDRESSES, |c, _, _| {
                Ok(vec![address_array(c.get_validators()?)])
            }),
            ImplMethod::new(&self, "GetActiveValidators", ADDRESSES, |c, _, _| {
                Ok(vec![address_array(c.get_active_validators()?)])
            }),
            ImplMethod::new(&self, "GetDelegatorValidators", ADDRESSES, |c, _, args| {
                let validators = c.get_delegator_validators(arg_address(args, 0)?)?;
                Ok(vec![address_array(validators)])
            }),
            ImplMethod::new(&self, "GetDelegation", "(uint256)", |c, _, args| {
                let amount = c.get_delegation(arg_address(args, 0)?, arg_address(args, 1)?)?;
                Ok(vec![uint(amount)])
            }),
            ImplMethod::new(&self, "GetUnbondingDelegation", ENTRIES, |c, _, args| {
                let entries =
                    c.get_unbonding_delegation(arg_address(args, 0)?, arg_address(args, 1)?)?;
                Ok(entry_columns(
                    entries.iter().map(|e| (e.creation_height, e.balance)),
                ))
            }),
            ImplMethod::new(&self, "GetRedelegations", ENTRIES, |c, _, args| {
                let entries = c.get_redelegations(
                    arg_address(args, 0)?,
                    arg_address(args, 1)?,
                    arg_address(args, 2)?,
                )?;
                Ok(entry_columns(
                    entries.iter().map(|e| (e.creation_height, e.balance)),
                ))
            }),
            ImplMethod::new(&self, "Delegate", SUCCESS, |c, ctx, args| {
                mutate(ctx, || {
                    c.delegate(ctx.caller, arg_address(args, 0)?, arg_uint(args, 1)?)?;
                    Ok(vec![DynSolValue::Bool(true)])
                })
            }),
            ImplMethod::new(&self, "Undelegate", SUCCESS, |c, ctx, args| {
                mutate(ctx, || {
                    c.undelegate(ctx.caller, arg_address(args, 0)?, arg_uint(args, 1)?)?;
                    Ok(vec![DynSolValue::Bool(true)])
                })
            }),
            ImplMethod::new(&self, "BeginRedelegate", SUCCESS, |c, ctx, args| {
                mutate(ctx, || {
                    c.begin_redelegate(
                        ctx.caller,
                        arg_address(args, 0)?,
                        arg_address(args, 1)?,
                        arg_uint(args, 2)?,
                    )?;
                    Ok(vec![DynSolValue::Bool(true)])
                })
            }),
            ImplMethod::new(&self, "CancelUnbondingDelegation", SUCCESS, |c, ctx, args| {
                mutate(ctx, || {
                    c.cancel_unbonding_delegation(
                        ctx.caller,
                        arg_address(args, 0)?,
                        arg_uint(args, 1)?,
                        arg_i64(args, 2)?,
                    )?;
                    Ok(vec![DynSolValue::Bool(true)])
                })
            }),
        ]
    }
}

/// Splits entries into the `(int64[] creationHeights, uint256[] balances)` pair.
fn entry_columns(entries: impl Iterator<Item = (i64, U256)>) -> Vec<DynSolValue> {
    let (heights, balances): (Vec<_>, Vec<_>) = entries
        .map(|(height, balance)| (int64(height), uint(balance)))
        .unzip();
    vec![DynSolValue::Array(heights), DynSolValue::Array(balances)]
}
