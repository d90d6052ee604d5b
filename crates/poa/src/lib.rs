//! Proof-of-Authority turn scheduling (§4.1): the consensus kernel deciding
//! when this node may propose and which candidates are marked active or
//! inactive as a result.

#![deny(missing_debug_implementations)]

mod error;
pub use error::SchedulerError;

mod scheduler;
pub use scheduler::{Proposer, Scheduler};

mod seeder;
pub use seeder::{AncestorSource, Seeder};
