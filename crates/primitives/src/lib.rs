//! Core value types shared by the Dexio consensus crates.
//!
//! This crate defines the vocabulary the rest of the workspace builds on: the
//! 20/32-byte identifiers, the fork-activation schedule, and the protocol
//! constants a PoA chain must agree on bit-for-bit.

#![deny(missing_debug_implementations)]

mod ids;
pub use ids::{Address, BigInt, Hash, Timestamp};

mod constants;
pub use constants::*;

mod fork;
pub use fork::ForkConfig;

mod keys;
pub use keys::{param_key, well_known};

mod builtin;
pub use builtin::{authority_address, measure_address, params_address};

mod error;
pub use error::PrimitivesError;
