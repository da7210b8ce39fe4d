//! Native methods bound to ABI methods.

use crate::{Result, abi::AbiMethod, context::CallContext};
use alloy::{dyn_abi::DynSolValue, primitives::Selector};
use std::{fmt, sync::Arc};

/// A native callable with its receiver already bound.
pub type MethodFn =
    Arc<dyn Fn(&CallContext, &[DynSolValue]) -> Result<Vec<DynSolValue>> + Send + Sync>;

/// A method a stateful contract offers for binding to its ABI.
///
/// `name` follows the implementation's naming (`GetValidator`); the table builder
/// lower-cases its first character before matching it against the ABI. Methods
/// whose name matches no ABI method are ignored.
#[derive(Clone)]
pub struct ImplMethod {
    name: String,
    returns: String,
    func: MethodFn,
}

impl ImplMethod {
    /// Binds `f` to `receiver`.
    ///
    /// `returns` is the canonical tuple of ABI types the method produces, e.g. `(bool)`.
    pub fn new<I, F>(
        receiver: &Arc<I>,
        name: impl Into<String>,
        returns: impl Into<String>,
        f: F,
    ) -> Self
    where
        I: Send + Sync + 'static,
        F: Fn(&I, &CallContext, &[DynSolValue]) -> Result<Vec<DynSolValue>>
            + Send
            + Sync
            + 'static,
    {
        let receiver = Arc::clone(receiver);
        Self {
            name: name.into(),
            returns: returns.into(),
            func: Arc::new(move |ctx: &CallContext, args: &[DynSolValue]| {
                f(&receiver, ctx, args)
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn returns(&self) -> &str {
        &self.returns
    }

    pub(crate) fn into_func(self) -> MethodFn {
        self.func
    }
}

impl fmt::Debug for ImplMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplMethod")
            .field("name", &self.name)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// An ABI method bound to its native implementation. Immutable once built.
pub struct Method {
    abi: Arc<AbiMethod>,
    selector: Selector,
    signature: String,
    func: MethodFn,
}

impl Method {
    pub(crate) fn new(abi: Arc<AbiMethod>, signature: String, func: MethodFn) -> Self {
        Self {
            selector: abi.selector(),
            abi,
            signature,
            func,
        }
    }

    pub fn abi(&self) -> &AbiMethod {
        &self.abi
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Calls the native implementation and returns its result untouched.
    pub fn call(&self, ctx: &CallContext, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("selector", &self.selector)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
