//! Test utilities: in-memory module servers and dispatch coverage checks

use crate::{
    address::{AddressError, Bech32Codec},
    container::PrecompileContainer,
    context::{CallContext, Plugin},
    dispatch,
    distribution::{
        DistributionMsgServer, DistributionParams, DistributionQuerier, MsgSetWithdrawAddress,
        MsgWithdrawDelegatorReward,
    },
    error::{BridgePrecompileError, Result},
    staking::{
        BondStatus, MsgBeginRedelegate, MsgCancelUnbondingDelegation, MsgDelegate,
        MsgUndelegate, RedelegationEntry, StakingMsgServer, StakingQuerier, UnbondingEntry,
        Validator,
    },
};
use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolError,
};
use modbridge_contracts::precompiles::UnknownFunctionSelector;
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Sends every selector of an interface to `container` and returns the ones it
/// answers with an `UnknownFunctionSelector` revert.
pub fn check_selector_coverage(
    container: &dyn PrecompileContainer,
    selectors: &[[u8; 4]],
    interface_name: &str,
    name_lookup: impl Fn([u8; 4]) -> Option<&'static str>,
) -> Vec<([u8; 4], &'static str)> {
    let ctx = CallContext::new(Address::ZERO);
    let unbound: Vec<_> = selectors
        .iter()
        .filter(|selector| {
            // a zero word stands in for the arguments
            let calldata = [selector.as_slice(), &[0u8; 32][..]].concat();
            matches!(dispatch::run(container, &calldata, &ctx), Ok(output)
                if output.reverted && UnknownFunctionSelector::abi_decode(&output.bytes).is_ok())
        })
        .filter_map(|selector| name_lookup(*selector).map(|name| (*selector, name)))
        .collect();

    for (selector, name) in &unbound {
        eprintln!("{interface_name}: no handler for {name} ({selector:?})");
    }
    unbound
}

/// Panics if any coverage check reported unbound selectors.
pub fn assert_full_coverage(results: impl IntoIterator<Item = Vec<([u8; 4], &'static str)>>) {
    let unbound: Vec<_> = results.into_iter().flatten().map(|(_, name)| name).collect();
    assert!(unbound.is_empty(), "{} selectors without a handler: {unbound:?}", unbound.len());
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Plugin reporting a fixed block height.
#[derive(Debug, Clone, Copy)]
pub struct FixedPlugin {
    height: i64,
}

impl FixedPlugin {
    pub fn new(height: i64) -> Self {
        Self { height }
    }
}

impl Plugin for FixedPlugin {
    fn block_height(&self) -> i64 {
        self.height
    }
}

#[derive(Debug, Default)]
struct StakingState {
    /// Validators by bech32 operator address
    validators: BTreeMap<String, Validator>,
    /// Delegated amount by (delegator, validator)
    delegations: BTreeMap<(String, String), U256>,
    unbonding: BTreeMap<(String, String), Vec<UnbondingEntry>>,
    redelegations: BTreeMap<(String, String, String), Vec<RedelegationEntry>>,
}

impl StakingState {
    fn validator_mut(&mut self, address: &str) -> Result<&mut Validator> {
        self.validators
            .get_mut(address)
            .ok_or_else(|| BridgePrecompileError::module(format!("validator {address} not found")))
    }

    fn bond(&mut self, delegator: &str, validator: &str, amount: U256) -> Result<()> {
        let entry = self.validator_mut(validator)?;
        entry.tokens += amount;
        entry.delegator_shares += amount;
        *self
            .delegations
            .entry((delegator.to_string(), validator.to_string()))
            .or_default() += amount;
        Ok(())
    }

    fn unbond(&mut self, delegator: &str, validator: &str, amount: U256) -> Result<()> {
        let key = (delegator.to_string(), validator.to_string());
        let delegated = self.delegations.get(&key).copied().unwrap_or_default();
        if delegated < amount {
            return Err(BridgePrecompileError::module("insufficient delegation"));
        }

        let entry = self.validator_mut(validator)?;
        entry.tokens -= amount;
        entry.delegator_shares -= amount;
        if delegated == amount {
            self.delegations.remove(&key);
        } else {
            self.delegations.insert(key, delegated - amount);
        }
        Ok(())
    }
}

/// Staking module kept in memory. Implements both the message server and the querier.
#[derive(Debug)]
pub struct InMemoryStaking {
    codec: Bech32Codec,
    height: i64,
    state: Mutex<StakingState>,
}

impl InMemoryStaking {
    pub fn new(codec: Bech32Codec) -> Self {
        Self {
            codec,
            height: 0,
            state: Mutex::default(),
        }
    }

    /// Height recorded on new unbonding and redelegation entries.
    pub fn with_height(mut self, height: i64) -> Self {
        self.height = height;
        self
    }

    pub fn add_validator(
        &self,
        operator: Address,
        status: BondStatus,
        moniker: &str,
    ) -> std::result::Result<(), AddressError> {
        let operator_address = self.codec.val_address(operator)?;
        lock(&self.state).validators.insert(
            operator_address.clone(),
            Validator {
                operator_address,
                consensus_pubkey: Bytes::from(operator.to_vec()),
                jailed: false,
                status,
                tokens: U256::ZERO,
                delegator_shares: U256::ZERO,
                moniker: moniker.to_string(),
            },
        );
        Ok(())
    }

    /// Total amount delegated by a bech32 delegator.
    pub fn delegated(&self, delegator: &str) -> U256 {
        lock(&self.state)
            .delegations
            .iter()
            .filter(|((d, _), _)| d == delegator)
            .fold(U256::ZERO, |total, (_, amount)| total + *amount)
    }
}

impl StakingMsgServer for InMemoryStaking {
    fn delegate(&self, msg: MsgDelegate) -> Result<()> {
        lock(&self.state).bond(&msg.delegator_address, &msg.validator_address, msg.amount)
    }

    fn undelegate(&self, msg: MsgUndelegate) -> Result<()> {
        let mut state = lock(&self.state);
        state.unbond(&msg.delegator_address, &msg.validator_address, msg.amount)?;
        state
            .unbonding
            .entry((msg.delegator_address, msg.validator_address))
            .or_default()
            .push(UnbondingEntry {
                creation_height: self.height,
                balance: msg.amount,
            });
        Ok(())
    }

    fn begin_redelegate(&self, msg: MsgBeginRedelegate) -> Result<()> {
        let mut state = lock(&self.state);
        if msg.validator_src_address == msg.validator_dst_address {
            return Err(BridgePrecompileError::module("cannot redelegate to the same validator"));
        }
        state.validator_mut(&msg.validator_dst_address)?;
        state.unbond(&msg.delegator_address, &msg.validator_src_address, msg.amount)?;
        state.bond(&msg.delegator_address, &msg.validator_dst_address, msg.amount)?;
        state
            .redelegations
            .entry((
                msg.delegator_address,
                msg.validator_src_address,
                msg.validator_dst_address,
            ))
            .or_default()
            .push(RedelegationEntry {
                creation_height: self.height,
                balance: msg.amount,
            });
        Ok(())
    }

    fn cancel_unbonding_delegation(&self, msg: MsgCancelUnbondingDelegation) -> Result<()> {
        let mut state = lock(&self.state);
        let key = (msg.delegator_address.clone(), msg.validator_address.clone());
        let entries = state.unbonding.get_mut(&key).ok_or_else(|| {
            BridgePrecompileError::module("no unbonding delegation found")
        })?;
        let index = entries
            .iter()
            .position(|entry| {
                entry.creation_height == msg.creation_height && entry.balance >= msg.amount
            })
            .ok_or_else(|| BridgePrecompileError::module("unbonding entry not found"))?;

        entries[index].balance -= msg.amount;
        if entries[index].balance.is_zero() {
            entries.remove(index);
        }
        if entries.is_empty() {
            state.unbonding.remove(&key);
        }
        state.bond(&msg.delegator_address, &msg.validator_address, msg.amount)
    }
}

impl StakingQuerier for InMemoryStaking {
    fn validator(&self, validator_address: &str) -> Result<Validator> {
        lock(&self.state)
            .validator_mut(validator_address)
            .map(|validator| validator.clone())
    }

    fn validators(&self) -> Result<Vec<Validator>> {
        Ok(lock(&self.state).validators.values().cloned().collect())
    }

    fn delegator_validators(&self, delegator_address: &str) -> Result<Vec<Validator>> {
        let state = lock(&self.state);
        Ok(state
            .delegations
            .keys()
            .filter(|(delegator, _)| delegator == delegator_address)
            .filter_map(|(_, validator)| state.validators.get(validator).cloned())
            .collect())
    }

    fn delegation(&self, delegator_address: &str, validator_address: &str) -> Result<U256> {
        Ok(lock(&self.state)
            .delegations
            .get(&(delegator_address.to_string(), validator_address.to_string()))
            .copied()
            .unwrap_or_default())
    }

    fn unbonding_delegation(
        &self,
        delegator_address: &str,
        validator_address: &str,
    ) -> Result<Vec<UnbondingEntry>> {
        Ok(lock(&self.state)
            .unbonding
            .get(&(delegator_address.to_string(), validator_address.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn redelegations(
        &self,
        delegator_address: &str,
        src_validator_address: &str,
        dst_validator_address: &str,
    ) -> Result<Vec<RedelegationEntry>> {
        let key = (
            delegator_address.to_string(),
            src_validator_address.to_string(),
            dst_validator_address.to_string(),
        );
        Ok(lock(&self.state)
            .redelegations
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Default)]
struct DistributionState {
    withdraw_addresses: BTreeMap<String, String>,
    /// Outstanding rewards by (delegator, validator)
    rewards: BTreeMap<(String, String), U256>,
}

/// Distribution module kept in memory. Implements both the message server and the querier.
#[derive(Debug)]
pub struct InMemoryDistribution {
    params: DistributionParams,
    state: Mutex<DistributionState>,
}

impl InMemoryDistribution {
    pub fn new(withdraw_addr_enabled: bool) -> Self {
        Self {
            params: DistributionParams {
                withdraw_addr_enabled,
            },
            state: Mutex::default(),
        }
    }

    /// Adds rewards for a bech32 delegator at a bech32 validator.
    pub fn accrue(&self, delegator: &str, validator: &str, amount: U256) {
        *lock(&self.state)
            .rewards
            .entry((delegator.to_string(), validator.to_string()))
            .or_default() += amount;
    }

    pub fn withdraw_address(&self, delegator: &str) -> Option<String> {
        lock(&self.state).withdraw_addresses.get(delegator).cloned()
    }
}

impl DistributionMsgServer for InMemoryDistribution {
    fn set_withdraw_address(&self, msg: MsgSetWithdrawAddress) -> Result<()> {
        if !self.params.withdraw_addr_enabled {
            return Err(BridgePrecompileError::module("set withdraw address disabled"));
        }
        lock(&self.state)
            .withdraw_addresses
            .insert(msg.delegator_address, msg.withdraw_address);
        Ok(())
    }

    fn withdraw_delegator_reward(&self, msg: MsgWithdrawDelegatorReward) -> Result<U256> {
        Ok(lock(&self.state)
            .rewards
            .remove(&(msg.delegator_address, msg.validator_address))
            .unwrap_or_default())
    }
}

impl DistributionQuerier for InMemoryDistribution {
    fn params(&self) -> Result<DistributionParams> {
        Ok(self.params)
    }
}
