//! Custom value decoders for values with no direct ABI representation.
//!
//! A contract maps an attribute key to a decoder; the log and argument decoding
//! done by the engine consults the map. The container only carries it.

use crate::address::{self, AddressError};
use alloy::dyn_abi::DynSolValue;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueDecodeError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("cannot decode {value}: {reason}")]
    Invalid { value: String, reason: String },
}

/// Converts a module-native encoding into the ABI value a method or log expects.
pub type ValueDecoder = fn(&str) -> Result<DynSolValue, ValueDecodeError>;

#[derive(Debug, Clone, Default)]
pub struct ValueDecoders(HashMap<String, ValueDecoder>);

impl ValueDecoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        decoder: ValueDecoder,
    ) -> Option<ValueDecoder> {
        self.0.insert(key.into(), decoder)
    }

    pub fn get(&self, key: &str) -> Option<ValueDecoder> {
        self.0.get(key).copied()
    }

    /// Runs the decoder registered for `key`, if any.
    pub fn decode(&self, key: &str, raw: &str) -> Option<Result<DynSolValue, ValueDecodeError>> {
        self.get(key).map(|decoder| decoder(raw))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ValueDecoder)> for ValueDecoders {
    fn from_iter<T: IntoIterator<Item = (K, ValueDecoder)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Decodes a bech32 account address of any prefix into an `address`.
pub fn acc_address_from_bech32(raw: &str) -> Result<DynSolValue, ValueDecodeError> {
    let (_, address) = address::decode(raw)?;
    Ok(DynSolValue::Address(address))
}

/// Decodes a base-10 integer amount, e.g. `"1000"` or `"1000stake"`, into a `uint256`.
pub fn amount_from_coin(raw: &str) -> Result<DynSolValue, ValueDecodeError> {
    let digits = raw.find(|c: char| !c.is_ascii_digit()).map_or(raw, |end| &raw[..end]);
    if digits.is_empty() {
        return Err(ValueDecodeError::Invalid {
            value: raw.to_string(),
            reason: "missing amount".to_string(),
        });
    }
    let amount = digits
        .parse::<alloy::primitives::U256>()
        .map_err(|e| ValueDecodeError::Invalid {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
    Ok(DynSolValue::Uint(amount, 256))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Bech32Codec;
    use alloy::primitives::{U256, address};

    #[test]
    fn test_acc_address_from_bech32() -> eyre::Result<()> {
        let addr = address!("0x2222222222222222222222222222222222222222");
        let bech32 = Bech32Codec::default().acc_address(addr)?;
        assert_eq!(acc_address_from_bech32(&bech32)?, DynSolValue::Address(addr));
        assert!(matches!(
            acc_address_from_bech32("0x2222"),
            Err(ValueDecodeError::Address(_))
        ));
        Ok(())
    }

    #[test]
    fn test_amount_from_coin() -> eyre::Result<()> {
        assert_eq!(amount_from_coin("1000stake")?, DynSolValue::Uint(U256::from(1000), 256));
        assert_eq!(amount_from_coin("42")?, DynSolValue::Uint(U256::from(42), 256));
        assert!(amount_from_coin("stake").is_err());
        Ok(())
    }

    #[test]
    fn test_lookup_by_key() {
        let decoders: ValueDecoders =
            [("withdraw_address", acc_address_from_bech32 as ValueDecoder)]
                .into_iter()
                .collect();
        assert_eq!(decoders.len(), 1);
        assert!(decoders.get("withdraw_address").is_some());
        assert!(decoders.decode("amount", "10").is_none());
    }
}
