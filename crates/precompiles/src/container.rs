//! Invocable precompile containers handed to the execution engine.

use crate::{
    BridgePrecompileError, Result,
    abi::{AbiMethod, AbiMethods},
    context::CallContext,
    decoders::ValueDecoders,
    method::{ImplMethod, Method},
};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Selector},
};
use std::{collections::HashMap, sync::Arc};

/// The object the engine calls for one precompile address.
pub trait PrecompileContainer: Send + Sync {
    /// Address the container is registered at.
    fn registry_key(&self) -> Address;

    /// Whether calldata is routed by selector through [`Self::abi_method`].
    ///
    /// Containers without an ABI receive the whole calldata instead.
    fn has_abi(&self) -> bool {
        false
    }

    /// ABI descriptor for `selector`, used to decode arguments and encode results.
    fn abi_method(&self, _selector: &Selector) -> Option<&AbiMethod> {
        None
    }

    /// Decoders for values the ABI cannot express directly.
    fn value_decoders(&self) -> Option<&ValueDecoders> {
        None
    }

    /// Runs the method identified by `selector` with already decoded arguments.
    fn invoke(
        &self,
        selector: Selector,
        ctx: &CallContext,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>>;
}

/// A contract that is its own container and routes selectors itself.
pub trait StatelessImpl: PrecompileContainer {}

/// A contract whose native methods are bound to its ABI by the stateful factory.
///
/// Chain access comes through the plugin handed to the contract's constructor.
pub trait StatefulImpl: Send + Sync {
    fn registry_key(&self) -> Address;

    /// Name used in registration errors and logs.
    fn name(&self) -> &'static str;

    fn abi_methods(&self) -> &AbiMethods;

    /// Candidate methods, bound to this instance. May include helpers absent
    /// from the ABI.
    fn precompile_methods(self: Arc<Self>) -> Vec<ImplMethod>;

    fn custom_value_decoders(&self) -> ValueDecoders {
        ValueDecoders::default()
    }
}

/// Which container kind a contract produces.
#[derive(Clone)]
pub enum Registrable {
    Stateless(Arc<dyn StatelessImpl>),
    Stateful(Arc<dyn StatefulImpl>),
}

impl Registrable {
    pub fn stateless(imp: impl StatelessImpl + 'static) -> Self {
        Self::Stateless(Arc::new(imp))
    }

    pub fn stateful(imp: impl StatefulImpl + 'static) -> Self {
        Self::Stateful(Arc::new(imp))
    }

    pub fn registry_key(&self) -> Address {
        match self {
            Self::Stateless(imp) => imp.registry_key(),
            Self::Stateful(imp) => imp.registry_key(),
        }
    }
}

impl std::fmt::Debug for Registrable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stateless(imp) => f.debug_tuple("Stateless").field(&imp.registry_key()).finish(),
            Self::Stateful(imp) => f.debug_tuple("Stateful").field(&imp.name()).finish(),
        }
    }
}

/// Container for a stateful contract: a selector table over its bound methods.
pub struct StatefulContainer {
    registry_key: Address,
    name: &'static str,
    methods: HashMap<Selector, Method>,
    decoders: ValueDecoders,
}

impl StatefulContainer {
    pub(crate) fn new(
        registry_key: Address,
        name: &'static str,
        methods: HashMap<Selector, Method>,
        decoders: ValueDecoders,
    ) -> Self {
        Self {
            registry_key,
            name,
            methods,
            decoders,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn method(&self, selector: &Selector) -> Option<&Method> {
        self.methods.get(selector)
    }

    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.methods.keys()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl PrecompileContainer for StatefulContainer {
    fn registry_key(&self) -> Address {
        self.registry_key
    }

    fn has_abi(&self) -> bool {
        true
    }

    fn abi_method(&self, selector: &Selector) -> Option<&AbiMethod> {
        self.method(selector).map(Method::abi)
    }

    fn value_decoders(&self) -> Option<&ValueDecoders> {
        Some(&self.decoders)
    }

    fn invoke(
        &self,
        selector: Selector,
        ctx: &CallContext,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        let method = self
            .method(&selector)
            .ok_or(BridgePrecompileError::UnknownMethod(selector))?;
        method.call(ctx, args)
    }
}

impl std::fmt::Debug for StatefulContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulContainer")
            .field("registry_key", &self.registry_key)
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
