use alloy::primitives::{Address, U256};

/// Per-call context supplied by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// `msg.sender` of the precompile call
    pub caller: Address,
    /// `msg.value` attached to the call
    pub value: U256,
    /// Whether the call happens inside a `STATICCALL`
    pub is_static: bool,
}

impl CallContext {
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::ZERO,
            is_static: false,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Read access to chain state that stateful contracts receive at construction.
///
/// Contracts keep a `Weak` reference; the host owns the plugin.
pub trait Plugin: Send + Sync {
    /// Height of the block currently being executed.
    fn block_height(&self) -> i64;
}
