use crate::{
    container::{PrecompileContainer, Registrable},
    context::CallContext,
    decoders::ValueDecoders,
    dispatch,
    error::FactoryError,
};
use alloy::primitives::Address;
use revm::precompile::PrecompileResult;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

/// Containers of every registered precompile, by address.
///
/// Filled once at startup; lookups afterwards are read-only.
#[derive(Default)]
pub struct PrecompileRegistry {
    containers: HashMap<Address, Arc<dyn PrecompileContainer>>,
}

impl PrecompileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the container for `registrable` with the factory its kind selects.
    pub fn register(&mut self, registrable: Registrable) -> Result<(), FactoryError> {
        let address = registrable.registry_key();
        if self.containers.contains_key(&address) {
            return Err(FactoryError::DuplicateRegistryKey(address));
        }

        let container = registrable.build()?;
        debug!(%address, ?registrable, "registered precompile");
        self.containers.insert(address, container);
        Ok(())
    }

    /// Registers every contract, stopping at the first failure.
    pub fn register_all(
        &mut self,
        registrables: impl IntoIterator<Item = Registrable>,
    ) -> Result<(), FactoryError> {
        registrables
            .into_iter()
            .try_for_each(|registrable| self.register(registrable))
    }

    pub fn get(&self, address: &Address) -> Option<&Arc<dyn PrecompileContainer>> {
        self.containers.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.containers.contains_key(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.containers.keys()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Decoders declared by the contract at `address`.
    pub fn value_decoders(&self, address: &Address) -> Option<&ValueDecoders> {
        self.get(address)?.value_decoders()
    }

    /// Runs `calldata` against the precompile at `address`, if there is one.
    pub fn run(
        &self,
        address: &Address,
        calldata: &[u8],
        ctx: &CallContext,
    ) -> Option<PrecompileResult> {
        self.get(address)
            .map(|container| dispatch::run(container.as_ref(), calldata, ctx))
    }
}

impl std::fmt::Debug for PrecompileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrecompileRegistry")
            .field("addresses", &self.containers.keys().collect::<Vec<_>>())
            .finish()
    }
}
