//! EVM precompiles backed by native chain modules.
//!
//! A contract is registered either as its own container ([`StatelessImpl`]) or as a
//! set of native methods bound to its ABI by the stateful factory ([`StatefulImpl`]).
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub use error::{BridgePrecompileError, FactoryError, IntoPrecompileResult, Result};

pub mod abi;
pub mod address;
pub mod container;
pub mod context;
pub mod decoders;
pub mod dispatch;
pub mod factory;
pub mod method;
pub mod registry;

pub mod distribution;
pub mod staking;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_util;

pub use abi::{AbiMethod, AbiMethods};
pub use address::{Bech32Codec, Bech32Config};
pub use container::{
    PrecompileContainer, Registrable, StatefulContainer, StatefulImpl, StatelessImpl,
};
pub use context::{CallContext, Plugin};
pub use decoders::{ValueDecoder, ValueDecoders};
pub use factory::{AbstractFactory, StatefulFactory, StatelessFactory};
pub use method::{ImplMethod, Method};
pub use registry::PrecompileRegistry;

pub use modbridge_contracts::precompiles::{
    DISTRIBUTION_PRECOMPILE_ADDRESS, STAKING_PRECOMPILE_ADDRESS,
};
