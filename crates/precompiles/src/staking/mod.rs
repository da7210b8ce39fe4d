pub mod dispatch;

pub use modbridge_contracts::precompiles::{IStakingModule, STAKING_PRECOMPILE_ADDRESS};

use crate::{
    abi::AbiMethods,
    address::{Bech32Codec, Bech32Config},
    context::Plugin,
    error::{BridgePrecompileError, Result},
};
use alloy::primitives::{Address, Bytes, U256};
use std::sync::{Arc, Weak};
use tracing::trace;

/// Bonding status of a validator, as reported by the staking module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BondStatus {
    #[default]
    Unspecified = 0,
    Unbonded = 1,
    Unbonding = 2,
    Bonded = 3,
}

/// Validator as reported by the staking module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    /// Bech32 operator address (`cosmosvaloper1...`)
    pub operator_address: String,
    pub consensus_pubkey: Bytes,
    pub jailed: bool,
    pub status: BondStatus,
    pub tokens: U256,
    pub delegator_shares: U256,
    pub moniker: String,
}

impl Validator {
    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnbondingEntry {
    pub creation_height: i64,
    pub balance: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedelegationEntry {
    pub creation_height: i64,
    pub balance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgDelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgUndelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgBeginRedelegate {
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgCancelUnbondingDelegation {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: U256,
    pub creation_height: i64,
}

/// State transitions of the staking module.
pub trait StakingMsgServer: Send + Sync {
    fn delegate(&self, msg: MsgDelegate) -> Result<()>;

    fn undelegate(&self, msg: MsgUndelegate) -> Result<()>;

    fn begin_redelegate(&self, msg: MsgBeginRedelegate) -> Result<()>;

    fn cancel_unbonding_delegation(&self, msg: MsgCancelUnbondingDelegation) -> Result<()>;
}

/// Read-only queries against the staking module. Addresses are bech32.
pub trait StakingQuerier: Send + Sync {
    fn validator(&self, validator_address: &str) -> Result<Validator>;

    fn validators(&self) -> Result<Vec<Validator>>;

    fn delegator_validators(&self, delegator_address: &str) -> Result<Vec<Validator>>;

    fn delegation(&self, delegator_address: &str, validator_address: &str) -> Result<U256>;

    fn unbonding_delegation(
        &self,
        delegator_address: &str,
        validator_address: &str,
    ) -> Result<Vec<UnbondingEntry>>;

    fn redelegations(
        &self,
        delegator_address: &str,
        src_validator_address: &str,
        dst_validator_address: &str,
    ) -> Result<Vec<RedelegationEntry>>;
}

/// Staking module precompile.
///
/// Translates between EVM addresses and the module's bech32 addresses and forwards
/// to the module's message server and querier. State-changing methods act on
/// behalf of the caller.
pub struct StakingContract {
    abi: AbiMethods,
    msg_server: Arc<dyn StakingMsgServer>,
    querier: Arc<dyn StakingQuerier>,
    plugin: Weak<dyn Plugin>,
    codec: Bech32Codec,
}

impl StakingContract {
    pub fn new(
        msg_server: Arc<dyn StakingMsgServer>,
        querier: Arc<dyn StakingQuerier>,
        plugin: Weak<dyn Plugin>,
        config: Bech32Config,
    ) -> Self {
        Self {
            abi: AbiMethods::from_json_abi(&IStakingModule::abi::contract()),
            msg_server,
            querier,
            plugin,
            codec: Bech32Codec::new(config),
        }
    }

    pub fn abi(&self) -> &AbiMethods {
        &self.abi
    }

    pub fn codec(&self) -> &Bech32Codec {
        &self.codec
    }

    fn plugin(&self) -> Result<Arc<dyn Plugin>> {
        self.plugin
            .upgrade()
            .ok_or_else(|| BridgePrecompileError::Fatal("staking plugin dropped".into()))
    }

    /// EVM address of a validator's bech32 operator address.
    fn operator(&self, validator: &Validator) -> Result<Address> {
        Ok(self.codec.address_from_val(&validator.operator_address)?)
    }

    fn operators<'a>(
        &self,
        validators: impl IntoIterator<Item = &'a Validator>,
    ) -> Result<Vec<Address>> {
        validators
            .into_iter()
            .map(|validator| self.operator(validator))
            .collect()
    }

    pub fn get_validator(&self, validator: Address) -> Result<(Address, Validator)> {
        let validator = self.querier.validator(&self.codec.val_address(validator)?)?;
        Ok((self.operator(&validator)?, validator))
    }

    pub fn get_validators(&self) -> Result<Vec<Address>> {
        self.operators(&self.querier.validators()?)
    }

    /// Operators of the bonded validator set.
    pub fn get_active_validators(&self) -> Result<Vec<Address>> {
        let validators = self.querier.validators()?;
        self.operators(validators.iter().filter(|validator| validator.is_bonded()))
    }

    pub fn get_delegator_validators(&self, delegator: Address) -> Result<Vec<Address>> {
        let validators = self
            .querier
            .delegator_validators(&self.codec.acc_address(delegator)?)?;
        self.operators(&validators)
    }

    pub fn get_delegation(&self, delegator: Address, validator: Address) -> Result<U256> {
        self.querier.delegation(
            &self.codec.acc_address(delegator)?,
            &self.codec.val_address(validator)?,
        )
    }

    pub fn get_unbonding_delegation(
        &self,
        delegator: Address,
        validator: Address,
    ) -> Result<Vec<UnbondingEntry>> {
        self.querier.unbonding_delegation(
            &self.codec.acc_address(delegator)?,
            &self.codec.val_address(validator)?,
        )
    }

    pub fn get_redelegations(
        &self,
        delegator: Address,
        src_validator: Address,
        dst_validator: Address,
    ) -> Result<Vec<RedelegationEntry>> {
        self.querier.redelegations(
            &self.codec.acc_address(delegator)?,
            &self.codec.val_address(src_validator)?,
            &self.codec.val_address(dst_validator)?,
        )
    }

    pub fn delegate(&self, caller: Address, validator: Address, amount: U256) -> Result<()> {
        trace!(%caller, %validator, %amount, "delegate");
        self.msg_server.delegate(MsgDelegate {
            delegator_address: self.codec.acc_address(caller)?,
            validator_address: self.codec.val_address(validator)?,
            amount,
        })
    }

    pub fn undelegate(&self, caller: Address, validator: Address, amount: U256) -> Result<()> {
        trace!(%caller, %validator, %amount, "undelegate");
        self.msg_server.undelegate(MsgUndelegate {
            delegator_address: self.codec.acc_address(caller)?,
            validator_address: self.codec.val_address(validator)?,
            amount,
        })
    }

    pub fn begin_redelegate(
        &self,
        caller: Address,
        src_validator: Address,
        dst_validator: Address,
        amount: U256,
    ) -> Result<()> {
        trace!(%caller, %src_validator, %dst_validator, %amount, "begin redelegate");
        self.msg_server.begin_redelegate(MsgBeginRedelegate {
            delegator_address: self.codec.acc_address(caller)?,
            validator_src_address: self.codec.val_address(src_validator)?,
            validator_dst_address: self.codec.val_address(dst_validator)?,
            amount,
        })
    }

    /// Cancels an unbonding entry. Creation heights above the current block are rejected.
    pub fn cancel_unbonding_delegation(
        &self,
        caller: Address,
        validator: Address,
        amount: U256,
        creation_height: i64,
    ) -> Result<()> {
        let height = self.plugin()?.block_height();
        if creation_height > height {
            return Err(BridgePrecompileError::module(format!(
                "creation height {creation_height} is above current height {height}"
            )));
        }

        trace!(%caller, %validator, %amount, creation_height, "cancel unbonding delegation");
        self.msg_server
            .cancel_unbonding_delegation(MsgCancelUnbondingDelegation {
                delegator_address: self.codec.acc_address(caller)?,
                validator_address: self.codec.val_address(validator)?,
                amount,
                creation_height,
            })
    }
}

impl std::fmt::Debug for StakingContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StakingContract")
            .field("methods", &self.abi.len())
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
