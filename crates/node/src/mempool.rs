//! A minimal FIFO mempool (§6: "a daemon that supplies `(parent, now,
//! mempool)`"): holds transactions the packer has not yet adopted.
//!
//! The core itself treats the mempool purely as a caller concern (§4.2's
//! `adopt` contract distinguishes rejections from retry-later failures
//! precisely so *some* caller-owned structure like this one can act on the
//! difference); this is the reference daemon's own, deliberately simple,
//! implementation of that caller.

use dexio_chain::Transaction;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// An in-memory, single-owner transaction pool.
#[derive(Debug, Default)]
pub struct Mempool {
    pending: VecDeque<Transaction>,
}

impl Mempool {
    pub fn new() -> Mempool {
        Mempool::default()
    }

    /// Queues `tx` for the next block(s).
    pub fn add(&mut self, tx: Transaction) {
        trace!(tx_id = ?tx.id(), "queued transaction");
        self.pending.push_back(tx);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drains every transaction currently queued into `flow`, in FIFO
    /// order, stopping as soon as the block's gas budget is exhausted.
    /// Transactions flagged not-yet-adoptable are put back for the next
    /// block; permanently rejected transactions are dropped and logged.
    pub fn fill(&mut self, flow: &mut dexio_packer::Flow) {
        let mut retry = VecDeque::new();
        while let Some(tx) = self.pending.pop_front() {
            let tx_for_retry = tx.clone();
            match flow.adopt(tx) {
                Ok(()) => {}
                Err(dexio_packer::AdoptError::GasLimitExceeded) => {
                    // The block is full; this transaction and everything
                    // still queued behind it wait for the next block.
                    retry.push_back(tx_for_retry);
                    break;
                }
                Err(dexio_packer::AdoptError::NotAdoptableNow(reason)) => {
                    debug!(%reason, "deferring transaction to a later block");
                    retry.push_back(tx_for_retry);
                }
                Err(err) => {
                    debug!(%err, "dropping transaction after an adoption error");
                }
            }
        }
        for tx in self.pending.drain(..) {
            retry.push_back(tx);
        }
        self.pending = retry;
    }
}
