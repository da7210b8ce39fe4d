//! ABI method descriptors for precompile contracts.

use crate::error::FactoryError;
use alloy::{
    json_abi::{Function, JsonAbi},
    primitives::Selector,
};
use std::{collections::BTreeMap, sync::Arc};

/// A single ABI method with its selector and canonical signature computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiMethod {
    /// Name the method is registered under. Overloads get a numeric suffix.
    name: String,
    function: Function,
    selector: Selector,
    signature: String,
}

impl AbiMethod {
    pub fn new(function: Function) -> Self {
        Self {
            name: function.name.clone(),
            selector: function.selector(),
            signature: function.signature(),
            function,
        }
    }

    /// Parses a human-readable signature such as
    /// `function delegate(address validator, uint256 amount) returns (bool)`.
    pub fn parse(signature: &str) -> Result<Self, FactoryError> {
        Function::parse(signature)
            .map(Self::new)
            .map_err(|e| FactoryError::InvalidAbi(e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Canonical tuple of the output types, e.g. `(address[],uint256)`.
    pub fn return_tuple(&self) -> String {
        let outputs: Vec<_> = self
            .function
            .outputs
            .iter()
            .map(|param| param.selector_type())
            .collect();
        format!("({})", outputs.join(","))
    }

    #[cfg(test)]
    pub(crate) fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }
}

/// The ABI method set of one precompile, keyed by method name.
#[derive(Debug, Clone, Default)]
pub struct AbiMethods {
    methods: BTreeMap<String, Arc<AbiMethod>>,
}

impl AbiMethods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_abi(abi: &JsonAbi) -> Self {
        abi.functions().cloned().map(AbiMethod::new).collect()
    }

    /// Builds the set from human-readable function signatures.
    pub fn parse<'a>(signatures: impl IntoIterator<Item = &'a str>) -> Result<Self, FactoryError> {
        signatures.into_iter().map(AbiMethod::parse).collect()
    }

    /// Inserts a method, renaming it `name0`, `name1`, ... if the name is taken.
    pub fn insert(&mut self, mut method: AbiMethod) {
        let raw = method.function.name.clone();
        let mut name = raw.clone();
        let mut idx = 0;
        while self.methods.contains_key(&name) {
            name = format!("{raw}{idx}");
            idx += 1;
        }
        method.name = name.clone();
        self.methods.insert(name, Arc::new(method));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<AbiMethod>> {
        self.methods.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AbiMethod>> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl FromIterator<AbiMethod> for AbiMethods {
    fn from_iter<T: IntoIterator<Item = AbiMethod>>(iter: T) -> Self {
        let mut methods = Self::new();
        for method in iter {
            methods.insert(method);
        }
        methods
    }
}
