//! Conversion between 20-byte EVM addresses and the module's bech32 addresses.

use alloy::primitives::Address;
use bech32::{Bech32, Hrp};

pub const DEFAULT_ACCOUNT_PREFIX: &str = "cosmos";
pub const DEFAULT_VALIDATOR_PREFIX: &str = "cosmosvaloper";

const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid bech32 address {address}: {reason}")]
    InvalidBech32 { address: String, reason: String },

    #[error("expected bech32 prefix {expected}, found {found}")]
    PrefixMismatch { expected: String, found: String },

    #[error("expected a 20-byte address, found {0} bytes")]
    InvalidLength(usize),
}

/// Human-readable prefixes used by the chain's bech32 addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bech32Config {
    pub account_prefix: String,
    pub validator_prefix: String,
}

impl Default for Bech32Config {
    fn default() -> Self {
        Self {
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
            validator_prefix: DEFAULT_VALIDATOR_PREFIX.to_string(),
        }
    }
}

/// Encodes and decodes account and validator operator addresses.
#[derive(Debug, Clone, Default)]
pub struct Bech32Codec {
    config: Bech32Config,
}

impl Bech32Codec {
    pub fn new(config: Bech32Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Bech32Config {
        &self.config
    }

    /// Account address (`cosmos1...`) for an EVM address.
    pub fn acc_address(&self, address: Address) -> Result<String, AddressError> {
        encode(&self.config.account_prefix, address)
    }

    /// Validator operator address (`cosmosvaloper1...`) for an EVM address.
    pub fn val_address(&self, address: Address) -> Result<String, AddressError> {
        encode(&self.config.validator_prefix, address)
    }

    pub fn address_from_acc(&self, bech32: &str) -> Result<Address, AddressError> {
        decode_with_prefix(&self.config.account_prefix, bech32)
    }

    pub fn address_from_val(&self, bech32: &str) -> Result<Address, AddressError> {
        decode_with_prefix(&self.config.validator_prefix, bech32)
    }
}

fn encode(prefix: &str, address: Address) -> Result<String, AddressError> {
    let invalid = |reason: String| AddressError::InvalidBech32 {
        address: address.to_string(),
        reason,
    };
    let hrp = Hrp::parse(prefix).map_err(|e| invalid(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, address.as_slice()).map_err(|e| invalid(e.to_string()))
}

fn decode_with_prefix(prefix: &str, bech32: &str) -> Result<Address, AddressError> {
    let (hrp, address) = decode(bech32)?;
    if hrp != prefix {
        return Err(AddressError::PrefixMismatch {
            expected: prefix.to_string(),
            found: hrp,
        });
    }
    Ok(address)
}

/// Decodes any bech32 address into its prefix and 20-byte payload.
pub fn decode(bech32: &str) -> Result<(String, Address), AddressError> {
    let (hrp, data) = bech32::decode(bech32).map_err(|e| AddressError::InvalidBech32 {
        address: bech32.to_string(),
        reason: e.to_string(),
    })?;
    if data.len() != ADDRESS_LEN {
        return Err(AddressError::InvalidLength(data.len()));
    }
    Ok((hrp.to_string(), Address::from_slice(&data)))
}
