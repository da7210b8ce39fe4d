use crate::address::AddressError;
use alloy::{
    primitives::{Address, Bytes, Selector},
    sol_types::{Revert, SolError},
};
use modbridge_contracts::precompiles::{StaticCallNotAllowed, UnknownFunctionSelector};
use revm::precompile::{PrecompileError, PrecompileOutput, PrecompileResult};

/// Errors raised while turning a registrable contract into a container.
///
/// Any of these means the contract is misconfigured and must not become callable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    /// The registrable was handed to the factory for the other container kind
    #[error("wrong container factory for this implementation kind: {container}")]
    WrongContainerFactory { container: &'static str },

    /// A native method's declared return tuple does not match its ABI outputs
    #[error(
        "{method}: precompile methods must return {expected}, but found {found} for precompile method"
    )]
    InvalidReturnShape {
        method: String,
        expected: String,
        found: String,
    },

    /// An ABI method has no native implementation bound to it
    #[error("no native implementation for declared ABI method `{0}`")]
    NoImplementationForAbiMethod(String),

    /// Two native methods were bound to the same ABI method
    #[error("{0}: more than one native implementation for ABI method")]
    DuplicateImplementation(String),

    /// A container is already registered at this address
    #[error("precompile already registered at {0}")]
    DuplicateRegistryKey(Address),

    /// The ABI descriptor set could not be built
    #[error("invalid ABI: {0}")]
    InvalidAbi(String),

    /// Error raised while building the named contract
    #[error("{name}: {source}")]
    Contract {
        name: &'static str,
        #[source]
        source: Box<FactoryError>,
    },
}

impl FactoryError {
    /// Wraps the error with the name of the contract being built.
    pub fn in_contract(self, name: &'static str) -> Self {
        Self::Contract {
            name,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping contract context.
    pub fn root(&self) -> &Self {
        match self {
            Self::Contract { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Top-level error type for precompile calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgePrecompileError {
    /// Selector is not part of the container's dispatch table
    #[error("unknown method: {0}")]
    UnknownMethod(Selector),

    /// State-changing method reached through a static call
    #[error("static call not allowed")]
    StaticCallNotAllowed,

    /// Decoded argument does not have the expected type
    #[error("invalid argument at position {index}: expected {expected}")]
    InvalidArgument { index: usize, expected: &'static str },

    /// Address conversion between hex and bech32 failed
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Business failure reported by the module
    #[error("module error: {0}")]
    Module(String),

    /// Values returned by a native method do not match its ABI outputs
    #[error("invalid return values: {0}")]
    InvalidReturn(String),

    #[error("Fatal precompile error: {0:?}")]
    Fatal(String),
}

impl BridgePrecompileError {
    pub fn module(msg: impl Into<String>) -> Self {
        Self::Module(msg.into())
    }
}

/// Result type alias for precompile calls
pub type Result<T> = std::result::Result<T, BridgePrecompileError>;

/// Extension trait to convert `Result<T, BridgePrecompileError>` into `PrecompileResult`
pub trait IntoPrecompileResult<T> {
    fn into_precompile_result(
        self,
        gas: u64,
        encode_ok: impl FnOnce(T) -> Bytes,
    ) -> PrecompileResult;
}

impl<T> IntoPrecompileResult<T> for Result<T> {
    fn into_precompile_result(
        self,
        gas: u64,
        encode_ok: impl FnOnce(T) -> Bytes,
    ) -> PrecompileResult {
        use BridgePrecompileError as BPErr;

        match self {
            Ok(res) => Ok(PrecompileOutput::new(gas, encode_ok(res))),
            Err(err) => {
                let bytes = match err {
                    BPErr::UnknownMethod(selector) => {
                        UnknownFunctionSelector { selector }.abi_encode()
                    }
                    BPErr::StaticCallNotAllowed => StaticCallNotAllowed {}.abi_encode(),
                    BPErr::Fatal(msg) => {
                        return Err(PrecompileError::Fatal(msg));
                    }
                    other => Revert {
                        reason: other.to_string(),
                    }
                    .abi_encode(),
                };
                Ok(PrecompileOutput::new_reverted(gas, bytes.into()))
            }
        }
    }
}
