//! Derives the per-epoch seed the v2 scheduler permutes its rotation with
//! (§4.1).

use crate::SchedulerError;
use alloy_primitives::keccak256;
use dexio_primitives::{Hash, SEED_WINDOW};

/// What the [`Seeder`] needs from a block repository: the ability to walk
/// `generations_back` steps up a block's ancestry and name the ancestor it
/// lands on.
///
/// Kept as a trait rather than a concrete dependency on `dexio-chain` so
/// `dexio-poa` stays a leaf crate; `dexio-chain::Repository` implements it.
pub trait AncestorSource {
    /// The ID of the ancestor of `id` that is `generations_back` blocks
    /// older, or `None` if that ancestor predates genesis.
    fn ancestor_id(&self, id: Hash, generations_back: u64) -> Option<Hash>;
}

/// Derives a VRF-style seed for v2 scheduling from a fixed-depth window of
/// ancestor block IDs.
///
/// The seed is the Keccak-256 of the concatenated IDs of `parent_id` and its
/// `SEED_WINDOW - 1` immediate predecessors. Folding a window rather than
/// hashing `parent_id` alone means the seed cannot be chosen by whoever
/// proposes a single block, while staying a pure, deterministic function of
/// the chain itself.
#[derive(Debug)]
pub struct Seeder<'a, R> {
    repo: &'a R,
}

impl<'a, R: AncestorSource> Seeder<'a, R> {
    /// Binds a seeder to a repository (or anything else implementing
    /// [`AncestorSource`]).
    pub fn new(repo: &'a R) -> Self {
        Seeder { repo }
    }

    /// Generates the v2 seed for the epoch ending at `parent_id`.
    ///
    /// Returns [`SchedulerError::SeedUnavailable`] if the ancestor window
    /// reaches past genesis rather than silently hashing a shorter window —
    /// a shorter window is a different seed, and producing one silently
    /// would make the seed depend on chain depth in a way callers can't see.
    pub fn generate(&self, parent_id: Hash) -> Result<Hash, SchedulerError> {
        let mut preimage = Vec::with_capacity(32 * SEED_WINDOW as usize);
        preimage.extend_from_slice(parent_id.as_slice());
        for generations_back in 1..SEED_WINDOW {
            let ancestor = self
                .repo
                .ancestor_id(parent_id, generations_back)
                .ok_or(SchedulerError::SeedUnavailable)?;
            preimage.extend_from_slice(ancestor.as_slice());
        }
        Ok(keccak256(preimage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeChain {
        parents: HashMap<Hash, Hash>,
    }

    impl AncestorSource for FakeChain {
        fn ancestor_id(&self, id: Hash, generations_back: u64) -> Option<Hash> {
            let mut cursor = id;
            for _ in 0..generations_back {
                cursor = *self.parents.get(&cursor)?;
            }
            Some(cursor)
        }
    }

    fn id(tag: u8) -> Hash {
        let mut bytes = [0u8; 32];
        bytes[31] = tag;
        Hash::from(bytes)
    }

    fn long_chain(len: u8) -> FakeChain {
        let mut parents = HashMap::new();
        for tag in 1..len {
            parents.insert(id(tag), id(tag - 1));
        }
        FakeChain { parents }
    }

    #[test]
    fn seed_is_deterministic() {
        let chain = long_chain(20);
        let seeder = Seeder::new(&chain);
        let a = seeder.generate(id(19)).unwrap();
        let b = seeder.generate(id(19)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_differs_between_parents() {
        let chain = long_chain(20);
        let seeder = Seeder::new(&chain);
        let a = seeder.generate(id(19)).unwrap();
        let b = seeder.generate(id(18)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn seed_unavailable_near_genesis() {
        let chain = long_chain(3);
        let seeder = Seeder::new(&chain);
        assert_eq!(seeder.generate(id(2)).unwrap_err(), SchedulerError::SeedUnavailable);
    }
}
