//! Native dispatch table standing in for bytecode execution (§6): clauses
//! whose `to` matches one of a small fixed set of built-in addresses are
//! routed to a Rust implementation instead of an interpreter, since a
//! bytecode-level EVM is out of scope (§1).

mod authority;
mod measure;
mod params;

pub(crate) use authority::dispatch_authority;
pub(crate) use measure::dispatch_measure;
pub(crate) use params::dispatch_params;

/// Gas charged for a native params `Get`.
pub const PARAMS_GET_GAS: u64 = 300;
/// Gas charged for a native params `Set`.
pub const PARAMS_SET_GAS: u64 = 5_000;
/// Gas charged for registering a new authority candidate.
pub const AUTHORITY_ADD_GAS: u64 = 25_000;
/// Gas charged for deregistering an authority candidate.
pub const AUTHORITY_REMOVE_GAS: u64 = 5_000;
/// Gas charged for flipping an authority candidate's liveness flag.
pub const AUTHORITY_UPDATE_GAS: u64 = 5_000;
