//! The block/transaction data model and the fork-aware chain reader
//! (§4.6): an append-only in-memory repository plus a single-owner cursor
//! that replays the divergence between any block and the current best.

#![deny(missing_debug_implementations)]

mod block;
pub use block::{Block, ExtendedBlock};

mod error;
pub use error::ChainError;

mod header;
pub use header::Header;

mod repository;
pub use repository::{BlockReader, Repository};

mod transaction;
pub use transaction::{Clause, Transaction};
