//! The outer production loop (§2: "the node's outer loop asks the Packer to
//! `schedule(parent, now)`... The Flow is then fed transactions until the
//! gas budget is met, at which point it produces a finalized block").
//!
//! Everything here is a caller concern the core itself stays agnostic to
//! (§5: "there are no internal timers; `schedule` takes `now` from the
//! caller") — this module is the reference daemon's own choice of how to
//! drive that contract, not part of the core's public surface.

use crate::mempool::Mempool;
use dexio_chain::Repository;
use dexio_packer::Packer;
use dexio_primitives::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Wall-clock "now", injected so the loop stays testable.
pub trait Clock {
    fn now(&self) -> Timestamp;
    fn sleep(&self, duration: Duration);
}

/// The system clock: [`std::time::SystemTime`] plus [`std::thread::sleep`].
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock is after the Unix epoch")
            .as_secs()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Drives one `Packer` against one `Repository`, producing and persisting
/// blocks on a fixed poll interval.
#[derive(Debug)]
pub struct Daemon<C> {
    packer: Packer,
    repo: Arc<Repository>,
    mempool: Mempool,
    signing_key: [u8; 32],
    poll_interval: Duration,
    clock: C,
}

impl<C: Clock> Daemon<C> {
    pub fn new(
        packer: Packer,
        repo: Arc<Repository>,
        signing_key: [u8; 32],
        poll_interval: Duration,
        clock: C,
    ) -> Daemon<C> {
        Daemon { packer, repo, mempool: Mempool::new(), signing_key, poll_interval, clock }
    }

    pub fn mempool_mut(&mut self) -> &mut Mempool {
        &mut self.mempool
    }

    /// Produces and persists exactly one block on top of the repository's
    /// current best block, sleeping first if this node's earliest legal
    /// slot is still in the future.
    ///
    /// Returns the produced block's ID. Scheduling failures
    /// (`NotAuthorized`, `NoActiveProposers`, `SeedUnavailable`) are not
    /// retried here (§7: "the core performs no retries internally") — the
    /// caller decides whether to try again next tick.
    pub fn produce_one(&mut self) -> anyhow::Result<dexio_primitives::Hash> {
        let parent = self.repo.get_header(self.repo.best_block_id())?;
        let now = self.clock.now();

        let mut flow = self.packer.schedule(&parent, now)?;
        let target = flow.when();
        if target > now {
            self.clock.sleep(Duration::from_secs(target - now));
        }

        self.mempool.fill(&mut flow);
        let new_block = flow.pack(&self.signing_key)?;
        let id = self.packer.accept(&new_block)?;
        self.repo.set_best_block_id(id);
        info!(number = new_block.block.header.number, %id, "produced block");
        Ok(id)
    }

    /// Runs [`Daemon::produce_one`] forever, logging and continuing past
    /// any single iteration's failure (consensus-fatal failures are the
    /// exception: a state-commit or trie error aborts the whole daemon,
    /// since the core gives no guidance on how to recover from one, §7).
    pub fn run_forever(&mut self) -> anyhow::Result<()> {
        loop {
            match self.produce_one() {
                Ok(_) => {}
                Err(err) => warn!(%err, "skipping this round"),
            }
            self.clock.sleep(self.poll_interval);
        }
    }
}
