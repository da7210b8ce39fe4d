//! Precompile container factories.
//!
//! The stateless factory hands the implementation back as its own container. The
//! stateful factory binds each of the implementation's native methods to the ABI
//! method with the same name and builds the selector table the container
//! dispatches through.

use crate::{
    abi::AbiMethods,
    container::{PrecompileContainer, Registrable, StatefulContainer},
    error::FactoryError,
    method::{ImplMethod, Method},
};
use alloy::primitives::Selector;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, trace};

// Container kinds named in wrong-factory errors.
const STATELESS_CONTAINER_NAME: &str = "StatelessContainerImpl";
const STATEFUL_CONTAINER_NAME: &str = "StatefulContainerImpl";

/// Builds the container for a registrable contract.
pub trait AbstractFactory {
    fn build(&self, registrable: &Registrable)
    -> Result<Arc<dyn PrecompileContainer>, FactoryError>;
}

impl Registrable {
    /// The factory matching this registrable's container kind.
    pub fn factory(&self) -> &'static dyn AbstractFactory {
        match self {
            Self::Stateless(_) => &StatelessFactory,
            Self::Stateful(_) => &StatefulFactory,
        }
    }

    /// Builds the container with the matching factory.
    pub fn build(&self) -> Result<Arc<dyn PrecompileContainer>, FactoryError> {
        self.factory().build(self)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatelessFactory;

impl AbstractFactory for StatelessFactory {
    fn build(
        &self,
        registrable: &Registrable,
    ) -> Result<Arc<dyn PrecompileContainer>, FactoryError> {
        let Registrable::Stateless(imp) = registrable else {
            return Err(FactoryError::WrongContainerFactory {
                container: STATELESS_CONTAINER_NAME,
            });
        };
        let container: Arc<dyn PrecompileContainer> = imp.clone();
        Ok(container)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatefulFactory;

impl AbstractFactory for StatefulFactory {
    fn build(
        &self,
        registrable: &Registrable,
    ) -> Result<Arc<dyn PrecompileContainer>, FactoryError> {
        let Registrable::Stateful(imp) = registrable else {
            return Err(FactoryError::WrongContainerFactory {
                container: STATEFUL_CONTAINER_NAME,
            });
        };

        let name = imp.name();
        let methods = build_ids_to_methods(imp.abi_methods(), imp.clone().precompile_methods())
            .map_err(|err| err.in_contract(name))?;

        debug!(
            contract = name,
            address = %imp.registry_key(),
            methods = methods.len(),
            "built stateful precompile container"
        );

        Ok(Arc::new(StatefulContainer::new(
            imp.registry_key(),
            name,
            methods,
            imp.custom_value_decoders(),
        )))
    }
}

/// Binds native methods to their ABI methods and indexes them by selector.
///
/// Candidates whose normalized name is not in the ABI are skipped. Every ABI method
/// must end up with exactly one native method.
pub fn build_ids_to_methods(
    abi: &AbiMethods,
    candidates: Vec<ImplMethod>,
) -> Result<HashMap<Selector, Method>, FactoryError> {
    let mut ids_to_methods = HashMap::with_capacity(abi.len());

    for candidate in candidates {
        let name = format_name(candidate.name());
        let Some(abi_method) = abi.get(&name) else {
            trace!(method = candidate.name(), "skipping method not declared in ABI");
            continue;
        };

        validate_return_shape(candidate.returns(), &abi_method.return_tuple())
            .map_err(|(expected, found)| FactoryError::InvalidReturnShape {
                method: name.clone(),
                expected,
                found,
            })?;

        let selector = abi_method.selector();
        if ids_to_methods.contains_key(&selector) {
            return Err(FactoryError::DuplicateImplementation(name));
        }
        ids_to_methods.insert(
            selector,
            Method::new(
                Arc::clone(abi_method),
                abi_method.signature().to_string(),
                candidate.into_func(),
            ),
        );
    }

    // every ABI method needs a native implementation
    if let Some(missing) = abi
        .iter()
        .find(|method| !ids_to_methods.contains_key(&method.selector()))
    {
        return Err(FactoryError::NoImplementationForAbiMethod(
            missing.name().to_string(),
        ));
    }

    Ok(ids_to_methods)
}

/// Lower-cases the first character of `name`.
pub fn format_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        // multi-char lowercase forms keep only their first char
        Some(first) => first.to_lowercase().take(1).chain(chars).collect(),
        None => String::new(),
    }
}

/// Compares a declared return tuple with the ABI's, ignoring whitespace.
fn validate_return_shape(declared: &str, expected: &str) -> Result<(), (String, String)> {
    let declared: String = declared.split_whitespace().collect();
    if declared == expected {
        Ok(())
    } else {
        Err((expected.to_string(), declared))
    }
}
