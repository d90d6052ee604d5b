//! The packing flow (§4.2): turns a scheduling decision into a concrete,
//! finalized block.
//!
//! [`Packer`] is stateless, cloneable configuration. Each call to
//! [`Packer::schedule`] or [`Packer::mock`] opens a fresh state view over
//! the parent's state root and hands back an owned [`Flow`] that the caller
//! feeds transactions until it closes the block with [`Flow::pack`].

#![deny(missing_debug_implementations)]

mod error;
mod flow;
mod merkle;
mod receipt;

pub use error::{AdoptError, NotAdoptableReason, PackError, RejectReason};
pub use flow::{recover_signer, BlockContext, Flow};
pub use receipt::{ClauseReceipt, Receipt};

use dexio_chain::{Block, ChainError, Header, Repository};
use dexio_poa::{Proposer as SchedulerProposer, Scheduler, Seeder};
use dexio_primitives::{
    well_known, Address, ForkConfig, Timestamp, GAS_LIMIT_BOUND_DIVISOR, MAX_BLOCK_PROPOSERS, MIN_GAS_LIMIT,
};
use dexio_state::{AuthorityRegistry, Params, State};
use dexio_trie::MemStore;
use parking_lot::RwLock;
use std::sync::Arc;

/// A finalized block, ready for `Packer::accept` (§4.2).
#[derive(Debug, Clone)]
pub struct NewBlock {
    pub block: Block,
    pub receipts: Vec<Receipt>,
    /// The authority registry snapshot this block's liveness updates were
    /// applied to; becomes canonical once `Packer::accept` is called.
    pub authority: AuthorityRegistry,
}

/// Stateless, shareable block-production configuration (§4.2).
///
/// `authority` is the one piece of mutable shared state a Packer owns
/// outside the trie: the authority registry is not trie-backed (§4.5, and
/// `dexio_evm::Runtime`'s own doc comment), so its canonical copy lives
/// behind an `RwLock` here and is only replaced — wholesale, from a
/// [`NewBlock`] — by [`Packer::accept`], mirroring `Repository`'s own
/// single-writer discipline for the best-block pointer.
#[derive(Debug, Clone)]
pub struct Packer {
    node_master: Address,
    beneficiary: Option<Address>,
    target_gas_limit: u64,
    chain_tag: u8,
    fork_config: ForkConfig,
    chain_repo: Arc<Repository>,
    store: Arc<MemStore>,
    authority: Arc<RwLock<AuthorityRegistry>>,
}

impl Packer {
    pub fn new(
        node_master: Address,
        chain_tag: u8,
        fork_config: ForkConfig,
        chain_repo: Arc<Repository>,
        store: Arc<MemStore>,
        authority: AuthorityRegistry,
    ) -> Packer {
        Packer {
            node_master,
            beneficiary: None,
            target_gas_limit: 0,
            chain_tag,
            fork_config,
            chain_repo,
            store,
            authority: Arc::new(RwLock::new(authority)),
        }
    }

    pub fn set_beneficiary(&mut self, beneficiary: Address) {
        self.beneficiary = Some(beneficiary);
    }

    pub fn set_target_gas_limit(&mut self, target_gas_limit: u64) {
        self.target_gas_limit = target_gas_limit;
    }

    /// A read-only snapshot of the current canonical authority registry.
    pub fn authority_snapshot(&self) -> AuthorityRegistry {
        self.authority.read().clone()
    }

    /// The production scheduling path (§4.2): resolves the beneficiary,
    /// filters candidates by endorsement, picks the scheduler version from
    /// the VIP214 fork gate, applies the resulting liveness updates to a
    /// private working copy of the authority registry, and returns a Flow
    /// bound to the computed `BlockContext`.
    pub fn schedule(&self, parent: &Header, now: Timestamp) -> Result<Flow, PackError> {
        let mut state = State::new(self.store.clone(), parent.state_root)?;
        let mut authority = self.authority.read().clone();

        let endorsement_threshold =
            Params::new(dexio_primitives::params_address(), &mut state).get(well_known::key_proposer_endorsement())?;
        let candidates = authority.candidates(endorsement_threshold, MAX_BLOCK_PROPOSERS, &state)?;
        let proposers: Vec<SchedulerProposer> =
            candidates.into_iter().map(|c| SchedulerProposer { address: c.address, active: c.active }).collect();

        let scheduler = if parent.number + 1 >= self.fork_config.vip214 {
            let seed = Seeder::new(self.chain_repo.as_ref()).generate(parent.id())?;
            Scheduler::new_v2(self.node_master, proposers, parent.number, parent.timestamp, seed)?
        } else {
            Scheduler::new_v1(self.node_master, proposers, parent.number, parent.timestamp)?
        };

        let new_block_time = scheduler.schedule(now);
        let (updates, score) = scheduler.updates(new_block_time);
        for (address, active) in updates {
            authority.update(address, active);
        }

        let beneficiary = match self.beneficiary {
            Some(b) => b,
            None => authority
                .iter()
                .find(|c| c.node_master == self.node_master)
                .map(|c| c.endorsor)
                .ok_or(PackError::NoImplicitBeneficiary)?,
        };

        let block_context = BlockContext {
            beneficiary,
            signer: self.node_master,
            number: parent.number + 1,
            time: new_block_time,
            gas_limit: qualify_gas_limit(self.target_gas_limit, parent.gas_limit),
            total_score: parent.total_score + score,
        };

        Ok(Flow::new(parent.clone(), self.chain_tag, state, authority, block_context, self.fork_config))
    }

    /// Bypasses PoA and scheduling to produce a non-consensus block for
    /// testing (§4.2): `signer == beneficiary == node_master` and the
    /// authority registry is carried through unmodified.
    pub fn mock(&self, parent: &Header, target_time: Timestamp, gas_limit: u64) -> Result<Flow, PackError> {
        let state = State::new(self.store.clone(), parent.state_root)?;
        let authority = self.authority.read().clone();

        let block_context = BlockContext {
            beneficiary: self.node_master,
            signer: self.node_master,
            number: parent.number + 1,
            time: target_time,
            gas_limit: qualify_gas_limit(gas_limit, parent.gas_limit),
            total_score: parent.total_score + 1,
        };

        Ok(Flow::new(parent.clone(), self.chain_tag, state, authority, block_context, self.fork_config))
    }

    /// Registers `new_block` in the repository and promotes its authority
    /// snapshot to canonical. Does not move the repository's best-block
    /// pointer; that remains the caller's single-writer decision (§5).
    pub fn accept(&self, new_block: &NewBlock) -> Result<dexio_primitives::Hash, ChainError> {
        let id = self.chain_repo.add_block(new_block.block.clone())?;
        *self.authority.write() = new_block.authority.clone();
        Ok(id)
    }
}

/// `qualify(target, parent)` (§4.2): `parent` verbatim if `target == 0`,
/// otherwise `target` clamped to within `parent / GAS_LIMIT_BOUND_DIVISOR`
/// of `parent` and never below `MIN_GAS_LIMIT`.
pub fn qualify_gas_limit(target: u64, parent: u64) -> u64 {
    if target == 0 {
        return parent;
    }
    let delta = parent / GAS_LIMIT_BOUND_DIVISOR;
    let lo = parent.saturating_sub(delta).max(MIN_GAS_LIMIT);
    let hi = parent.saturating_add(delta).max(lo);
    target.clamp(lo, hi)
}
