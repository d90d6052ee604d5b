//! The built-in authority registry (§4.5): PoA candidates in their
//! intrinsic insertion order, filtered by endorsement balance for
//! scheduling.
//!
//! Modeled as an arena of slots linked by index rather than owned/boxed
//! nodes, per the design notes (§9): deletion is a O(1) splice with no
//! ownership cycles to fight the borrow checker over.

use crate::{State, StateError};
use dexio_primitives::{Address, BigInt, Hash};
use rustc_hash::FxHashMap;

/// One registered PoA candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub node_master: Address,
    pub endorsor: Address,
    pub identity: Hash,
    pub active: bool,
}

/// A scheduler-facing view of one active-or-not proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposer {
    pub address: Address,
    pub active: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    candidate: Candidate,
    prev: Option<usize>,
    next: Option<usize>,
}

/// An ordered, update-in-place registry of authority candidates.
///
/// Cloned by a packing flow into a private working copy at scheduling time
/// so that liveness updates applied while a block is being built can be
/// discarded along with the rest of the flow's state if `pack` never
/// succeeds (§4.2's fail-closed invariant).
#[derive(Debug, Clone, Default)]
pub struct AuthorityRegistry {
    slots: Vec<Option<Slot>>,
    index: FxHashMap<Address, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Vec<usize>,
}

impl AuthorityRegistry {
    pub fn new() -> AuthorityRegistry {
        AuthorityRegistry::default()
    }

    /// Appends `candidate` to the end of the registry, preserving order.
    /// Replaces an existing entry with the same `node_master` in place.
    pub fn add(&mut self, candidate: Candidate) {
        if let Some(&idx) = self.index.get(&candidate.node_master) {
            self.slots[idx].as_mut().expect("indexed slot is occupied").candidate = candidate;
            return;
        }

        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };

        let prev = self.tail;
        self.slots[idx] = Some(Slot { candidate: candidate.clone(), prev, next: None });
        if let Some(prev_idx) = prev {
            self.slots[prev_idx].as_mut().expect("tail slot is occupied").next = Some(idx);
        } else {
            self.head = Some(idx);
        }
        self.tail = Some(idx);
        self.index.insert(candidate.node_master, idx);
    }

    /// Removes the candidate registered under `node_master`, if any.
    /// Returns whether a candidate was actually removed.
    pub fn remove(&mut self, node_master: Address) -> bool {
        let Some(idx) = self.index.remove(&node_master) else {
            return false;
        };
        let slot = self.slots[idx].take().expect("indexed slot is occupied");

        match slot.prev {
            Some(prev_idx) => self.slots[prev_idx].as_mut().expect("prev slot is occupied").next = slot.next,
            None => self.head = slot.next,
        }
        match slot.next {
            Some(next_idx) => self.slots[next_idx].as_mut().expect("next slot is occupied").prev = slot.prev,
            None => self.tail = slot.prev,
        }
        self.free.push(idx);
        true
    }

    /// Flips the liveness flag for `node_master`. Returns whether the
    /// candidate was found.
    pub fn update(&mut self, node_master: Address, active: bool) -> bool {
        let Some(&idx) = self.index.get(&node_master) else {
            return false;
        };
        self.slots[idx].as_mut().expect("indexed slot is occupied").candidate.active = active;
        true
    }

    /// Candidates whose endorsor holds at least `endorsement_threshold`,
    /// in registry order, capped at `max` entries.
    pub fn candidates(
        &self,
        endorsement_threshold: BigInt,
        max: usize,
        state: &State,
    ) -> Result<Vec<Proposer>, StateError> {
        let mut out = Vec::with_capacity(max.min(self.index.len()));
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let slot = self.slots[idx].as_ref().expect("linked slot is occupied");
            let endorsement = state.get_balance(slot.candidate.endorsor)?;
            if endorsement >= endorsement_threshold {
                out.push(Proposer { address: slot.candidate.node_master, active: slot.candidate.active });
                if out.len() >= max {
                    break;
                }
            }
            cursor = slot.next;
        }
        Ok(out)
    }

    /// All registered candidates, in registry order. Intended for tests and
    /// diagnostics, not for scheduling (use [`AuthorityRegistry::candidates`]).
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let idx = cursor?;
            let slot = self.slots[idx].as_ref().expect("linked slot is occupied");
            cursor = slot.next;
            Some(&slot.candidate)
        })
    }
}
