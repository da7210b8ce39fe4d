//! Calldata-level dispatch into precompile containers.

use crate::{
    BridgePrecompileError, IntoPrecompileResult, Result, container::PrecompileContainer,
    context::CallContext,
};
use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    primitives::{Address, Bytes, I256, Selector, U256},
};
use revm::precompile::{PrecompileError, PrecompileOutput, PrecompileResult};
use tracing::debug;

/// Runs `calldata` against `container`.
///
/// Containers with an ABI route on the leading selector, which picks the
/// descriptor used to decode the arguments and encode the results. Containers
/// without one get the whole calldata as a single `bytes` value and must answer
/// with one.
pub fn run(
    container: &dyn PrecompileContainer,
    calldata: &[u8],
    ctx: &CallContext,
) -> PrecompileResult {
    if !container.has_abi() {
        let mut selector = Selector::ZERO;
        let len = calldata.len().min(4);
        selector[..len].copy_from_slice(&calldata[..len]);
        return container
            .invoke(selector, ctx, &[DynSolValue::Bytes(calldata.to_vec())])
            .and_then(into_raw_output)
            .into_precompile_result(0, |bytes| bytes);
    }

    let Some((selector, input)) = calldata.split_first_chunk::<4>() else {
        return Err(PrecompileError::Other(
            "Invalid input: missing function selector".into(),
        ));
    };
    let selector = Selector::from(*selector);

    let Some(method) = container.abi_method(&selector) else {
        return Err::<(), _>(BridgePrecompileError::UnknownMethod(selector))
            .into_precompile_result(0, |()| Bytes::new());
    };

    let args = match method.function().abi_decode_input(input) {
        Ok(args) => args,
        Err(err) => {
            debug!(method = method.signature(), %err, "failed to decode precompile input");
            return Ok(PrecompileOutput::new_reverted(0, Bytes::new()));
        }
    };

    container
        .invoke(selector, ctx, &args)
        .and_then(|values| {
            method
                .function()
                .abi_encode_output(&values)
                .map_err(|err| BridgePrecompileError::InvalidReturn(err.to_string()))
        })
        .into_precompile_result(0, Bytes::from)
}

fn into_raw_output(values: Vec<DynSolValue>) -> Result<Bytes> {
    match values.as_slice() {
        [] => Ok(Bytes::new()),
        [DynSolValue::Bytes(bytes)] => Ok(Bytes::copy_from_slice(bytes)),
        _ => Err(BridgePrecompileError::InvalidReturn(
            "expected a single bytes value".into(),
        )),
    }
}

/// Rejects static calls before running a state-changing method.
#[inline]
pub fn mutate(
    ctx: &CallContext,
    f: impl FnOnce() -> Result<Vec<DynSolValue>>,
) -> Result<Vec<DynSolValue>> {
    if ctx.is_static {
        return Err(BridgePrecompileError::StaticCallNotAllowed);
    }
    f()
}

pub fn arg_address(args: &[DynSolValue], index: usize) -> Result<Address> {
    args.get(index)
        .and_then(DynSolValue::as_address)
        .ok_or(BridgePrecompileError::InvalidArgument {
            index,
            expected: "address",
        })
}

pub fn arg_uint(args: &[DynSolValue], index: usize) -> Result<U256> {
    args.get(index)
        .and_then(DynSolValue::as_uint)
        .map(|(value, _)| value)
        .ok_or(BridgePrecompileError::InvalidArgument {
            index,
            expected: "uint256",
        })
}

pub fn arg_i64(args: &[DynSolValue], index: usize) -> Result<i64> {
    let invalid = BridgePrecompileError::InvalidArgument {
        index,
        expected: "int64",
    };
    let (value, _) = args
        .get(index)
        .and_then(DynSolValue::as_int)
        .ok_or_else(|| invalid.clone())?;
    i64::try_from(value).map_err(|_| invalid)
}

pub fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}

pub fn int64(value: i64) -> DynSolValue {
    let magnitude = I256::from_raw(U256::from(value.unsigned_abs()));
    let value = if value < 0 { -magnitude } else { magnitude };
    DynSolValue::Int(value, 64)
}

pub fn address_array(addresses: impl IntoIterator<Item = Address>) -> DynSolValue {
    DynSolValue::Array(addresses.into_iter().map(DynSolValue::Address).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abi::AbiMethods,
        container::{Registrable, StatefulImpl, StatelessImpl},
        method::ImplMethod,
    };
    use alloy::{
        primitives::{U256, address, keccak256},
        sol,
        sol_types::{Revert, SolCall, SolError},
    };
    use modbridge_contracts::precompiles::{StaticCallNotAllowed, UnknownFunctionSelector};
    use std::sync::Arc;

    sol! {
        interface ICounter {
            function add(uint256 a, int64 b) external returns (uint256 sum);
            function bump() external returns (bool ok);
        }
    }

    struct Counter {
        abi: AbiMethods,
    }

    impl StatefulImpl for Counter {
        fn registry_key(&self) -> Address {
            address!("0x0000000000000000000000000000000000000c01")
        }

        fn name(&self) -> &'static str {
            "Counter"
        }

        fn abi_methods(&self) -> &AbiMethods {
            &self.abi
        }

        fn precompile_methods(self: Arc<Self>) -> Vec<ImplMethod> {
            vec![
                ImplMethod::new(&self, "Add", "(uint256)", |_, _, args| {
                    let a = arg_uint(args, 0)?;
                    let b = arg_i64(args, 1)?;
                    Ok(vec![uint(a + U256::from(b.unsigned_abs()))])
                }),
                ImplMethod::new(&self, "Bump", "(bool)", |_, ctx, _| {
                    mutate(ctx, || Ok(vec![DynSolValue::Bool(true)]))
                }),
            ]
        }
    }

    fn counter() -> Registrable {
        Registrable::stateful(Counter {
            abi: AbiMethods::parse([
                "function add(uint256 a, int64 b) returns (uint256 sum)",
                "function bump() returns (bool ok)",
            ])
            .unwrap(),
        })
    }

    struct Keccak;

    impl PrecompileContainer for Keccak {
        fn registry_key(&self) -> Address {
            address!("0x0000000000000000000000000000000000000c02")
        }

        fn invoke(
            &self,
            _: Selector,
            _: &CallContext,
            args: &[DynSolValue],
        ) -> Result<Vec<DynSolValue>> {
            let Some(DynSolValue::Bytes(input)) = args.first() else {
                return Err(BridgePrecompileError::InvalidArgument {
                    index: 0,
                    expected: "bytes",
                });
            };
            Ok(vec![DynSolValue::Bytes(keccak256(input).to_vec())])
        }
    }

    impl StatelessImpl for Keccak {}

    #[test]
    fn test_decode_invoke_encode() -> eyre::Result<()> {
        let container = counter().build()?;
        let calldata = ICounter::addCall {
            a: U256::from(40),
            b: 2,
        }
        .abi_encode();

        let output = run(container.as_ref(), &calldata, &CallContext::new(Address::ZERO))?;
        assert!(!output.reverted);
        assert_eq!(ICounter::addCall::abi_decode_returns(&output.bytes)?, U256::from(42));
        Ok(())
    }

    #[test]
    fn test_stateful_call_without_selector() -> eyre::Result<()> {
        let container = counter().build()?;
        let result = run(container.as_ref(), &[0x12, 0x34], &CallContext::new(Address::ZERO));
        assert!(matches!(result, Err(PrecompileError::Other(_))));
        Ok(())
    }

    #[test]
    fn test_unknown_selector_reverts() -> eyre::Result<()> {
        let container = counter().build()?;
        let output = run(
            container.as_ref(),
            &[0x12, 0x34, 0x56, 0x78],
            &CallContext::new(Address::ZERO),
        )?;
        assert!(output.reverted);

        let decoded = UnknownFunctionSelector::abi_decode(&output.bytes)?;
        assert_eq!(decoded.selector.as_slice(), &[0x12, 0x34, 0x56, 0x78]);
        Ok(())
    }

    #[test]
    fn test_malformed_arguments_revert() -> eyre::Result<()> {
        let container = counter().build()?;
        let mut calldata = ICounter::addCall::SELECTOR.to_vec();
        calldata.extend_from_slice(&[0xff; 7]);

        let output = run(container.as_ref(), &calldata, &CallContext::new(Address::ZERO))?;
        assert!(output.reverted);
        assert!(output.bytes.is_empty());
        Ok(())
    }

    #[test]
    fn test_static_call_into_mutating_method() -> eyre::Result<()> {
        let container = counter().build()?;
        let calldata = ICounter::bumpCall {}.abi_encode();

        let ctx = CallContext::new(Address::ZERO).into_static();
        let output = run(container.as_ref(), &calldata, &ctx)?;
        assert!(output.reverted);
        assert!(StaticCallNotAllowed::abi_decode(&output.bytes).is_ok());

        let output = run(container.as_ref(), &calldata, &CallContext::new(Address::ZERO))?;
        assert!(!output.reverted);
        assert!(ICounter::bumpCall::abi_decode_returns(&output.bytes)?);
        Ok(())
    }

    #[test]
    fn test_stateless_gets_whole_calldata() -> eyre::Result<()> {
        let container = Registrable::stateless(Keccak).build()?;
        let calldata = [0xaa, 0xbb, 0xcc, 0xdd, 0x01, 0x02];

        let output = run(container.as_ref(), &calldata, &CallContext::new(Address::ZERO))?;
        assert!(!output.reverted);
        assert_eq!(output.bytes.as_ref(), keccak256(calldata).as_slice());
        Ok(())
    }

    #[test]
    fn test_stateless_accepts_short_input() -> eyre::Result<()> {
        let container = Registrable::stateless(Keccak).build()?;
        let ctx = CallContext::new(Address::ZERO);

        let inputs: [&[u8]; 4] = [&[], &[0x01], &[0x01, 0x02], &[0x01, 0x02, 0x03]];
        for calldata in inputs {
            let output = run(container.as_ref(), calldata, &ctx)?;
            assert!(!output.reverted);
            assert_eq!(output.bytes.as_ref(), keccak256(calldata).as_slice());
        }
        Ok(())
    }

    #[test]
    fn test_invalid_argument_reverts_with_reason() {
        let err = arg_address(&[DynSolValue::Bool(true)], 0).unwrap_err();
        let output = Err::<(), _>(err)
            .into_precompile_result(0, |()| Bytes::new())
            .unwrap();
        assert!(output.reverted);
        assert_eq!(
            Revert::abi_decode(&output.bytes).unwrap().reason,
            "invalid argument at position 0: expected address"
        );
    }

    #[test]
    fn test_int64_helpers() -> eyre::Result<()> {
        assert_eq!(arg_i64(&[int64(-7)], 0)?, -7);
        assert_eq!(arg_i64(&[int64(i64::MIN)], 0)?, i64::MIN);
        assert_eq!(arg_i64(&[int64(i64::MAX)], 0)?, i64::MAX);
        assert!(arg_i64(&[], 0).is_err());
        Ok(())
    }
}
