//! The EVM runtime façade (§4, §6): binds account state, the authority
//! registry, a block context and a fork config together so a clause can be
//! dispatched against the fixed table of native contracts. A bytecode-level
//! interpreter is out of scope (§1) — every clause this crate can execute
//! either targets a native contract or is a gas-free no-op.

#![deny(missing_debug_implementations)]

mod context;
mod error;
mod native;
mod runtime;

pub use context::{BlockContext, TransactionContext};
pub use error::RuntimeError;
pub use runtime::{ExecutionOutput, Executor, Runtime, VmError};
