pub mod dispatch;

pub use modbridge_contracts::precompiles::{
    ATTRIBUTE_KEY_WITHDRAW_ADDRESS, DISTRIBUTION_PRECOMPILE_ADDRESS, IDistributionModule,
};

use crate::{
    abi::AbiMethods,
    address::{Bech32Codec, Bech32Config},
    error::Result,
};
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::trace;

/// Event attribute key carrying a coin amount.
pub const ATTRIBUTE_KEY_AMOUNT: &str = "amount";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistributionParams {
    pub withdraw_addr_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgSetWithdrawAddress {
    pub delegator_address: String,
    pub withdraw_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgWithdrawDelegatorReward {
    pub delegator_address: String,
    pub validator_address: String,
}

/// State transitions of the distribution module.
pub trait DistributionMsgServer: Send + Sync {
    fn set_withdraw_address(&self, msg: MsgSetWithdrawAddress) -> Result<()>;

    /// Withdraws the delegator's rewards and returns the amount paid out.
    fn withdraw_delegator_reward(&self, msg: MsgWithdrawDelegatorReward) -> Result<U256>;
}

pub trait DistributionQuerier: Send + Sync {
    fn params(&self) -> Result<DistributionParams>;
}

/// Distribution module precompile.
pub struct DistributionContract {
    abi: AbiMethods,
    msg_server: Arc<dyn DistributionMsgServer>,
    querier: Arc<dyn DistributionQuerier>,
    codec: Bech32Codec,
}

impl DistributionContract {
    pub fn new(
        msg_server: Arc<dyn DistributionMsgServer>,
        querier: Arc<dyn DistributionQuerier>,
        config: Bech32Config,
    ) -> Self {
        Self {
            abi: AbiMethods::from_json_abi(&IDistributionModule::abi::contract()),
            msg_server,
            querier,
            codec: Bech32Codec::new(config),
        }
    }

    pub fn abi(&self) -> &AbiMethods {
        &self.abi
    }

    /// Sets the caller's withdraw address.
    pub fn set_withdraw_address(&self, caller: Address, withdraw_address: Address) -> Result<()> {
        trace!(%caller, %withdraw_address, "set withdraw address");
        self.msg_server.set_withdraw_address(MsgSetWithdrawAddress {
            delegator_address: self.codec.acc_address(caller)?,
            withdraw_address: self.codec.acc_address(withdraw_address)?,
        })
    }

    pub fn get_withdraw_enabled(&self) -> Result<bool> {
        Ok(self.querier.params()?.withdraw_addr_enabled)
    }

    pub fn withdraw_delegator_reward(
        &self,
        delegator: Address,
        validator: Address,
    ) -> Result<U256> {
        trace!(%delegator, %validator, "withdraw delegator reward");
        self.msg_server
            .withdraw_delegator_reward(MsgWithdrawDelegatorReward {
                delegator_address: self.codec.acc_address(delegator)?,
                validator_address: self.codec.val_address(validator)?,
            })
    }
}

impl std::fmt::Debug for DistributionContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributionContract")
            .field("methods", &self.abi.len())
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
