//! A secure, in-memory Merkle-Patricia trie.
//!
//! This is the one concrete implementation of the trie/KV interface the
//! account state engine is written against. A production node would swap in
//! a disk-backed trie library without `dexio-state` changing; this crate
//! exists so the core has something real to run against in tests and the
//! reference node binary.

#![deny(missing_debug_implementations)]

mod error;
mod nibble;
mod node;

pub use error::TrieError;
pub use nibble::{from_nibbles, to_nibbles};

use alloy_primitives::keccak256;
use dexio_primitives::Hash;
use node::{Node, NodeStore};
use parking_lot::RwLock;
use std::sync::Arc;

pub use node::empty_root;

/// The backing key-value store for one or more [`Trie`]s.
///
/// Every node is addressed by the Keccak-256 hash of its RLP encoding, so a
/// single store can safely back the main account trie and every account's
/// storage trie at once: there is no risk of one trie's nodes colliding with
/// another's.
#[derive(Debug, Default)]
pub struct MemStore(RwLock<NodeStore>);

impl MemStore {
    /// Creates a fresh, empty store (`NewMem` in the external interface).
    pub fn new_mem() -> Arc<MemStore> {
        Arc::new(MemStore::default())
    }
}

/// A secure Merkle-Patricia trie: keys are hashed with Keccak-256 before
/// being used as trie paths, so trie depth cannot be biased by an adversary
/// who controls raw keys (account addresses, storage slots).
#[derive(Debug)]
pub struct Trie {
    name: String,
    store: Arc<MemStore>,
    root: Node,
}

impl Trie {
    /// Opens a secure trie named `name` rooted at `root` against `store`.
    ///
    /// `root` must be [`empty_root`] for a brand new trie, or a hash
    /// previously returned by [`Trie::commit`] on the same store.
    pub fn new_secure_trie(
        name: impl Into<String>,
        store: Arc<MemStore>,
        root: Hash,
    ) -> Result<Trie, TrieError> {
        let loaded = {
            let guard = store.0.read();
            node::load_root(root, &guard)?
        };
        Ok(Trie { name: name.into(), store, root: loaded })
    }

    /// The trie's name, as passed to [`Trie::new_secure_trie`].
    pub fn name(&self) -> &str {
        &self.name
    }

    fn secure_key(key: &[u8]) -> Vec<u8> {
        to_nibbles(keccak256(key).as_slice())
    }

    /// Looks up `key`, returning its value if present.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        node::get(&self.root, &Self::secure_key(key)).map(<[u8]>::to_vec)
    }

    /// Sets `key` to `value`. An empty `value` deletes the key instead,
    /// matching the external interface's delete-via-empty-write contract.
    pub fn update(&mut self, key: &[u8], value: Vec<u8>) {
        let path = Self::secure_key(key);
        let current = std::mem::replace(&mut self.root, Node::Empty);
        self.root = if value.is_empty() {
            node::delete(current, &path).0
        } else {
            node::insert(current, &path, value)
        };
    }

    /// Persists every node reachable from the current root into the
    /// backing store and returns the new root hash.
    pub fn commit(&mut self) -> Hash {
        match &self.root {
            Node::Empty => empty_root(),
            root => {
                let mut guard = self.store.0.write();
                node::store_node(root, &mut guard)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_trie_is_empty() {
        let store = MemStore::new_mem();
        let trie = Trie::new_secure_trie("account", store, empty_root()).unwrap();
        assert_eq!(trie.get(b"anything"), None);
    }

    #[test]
    fn update_then_get_round_trips() {
        let store = MemStore::new_mem();
        let mut trie = Trie::new_secure_trie("account", store, empty_root()).unwrap();
        trie.update(b"key", b"value".to_vec());
        assert_eq!(trie.get(b"key"), Some(b"value".to_vec()));
    }

    #[test]
    fn empty_value_deletes_like_storage_zero_write() {
        let store = MemStore::new_mem();
        let mut trie = Trie::new_secure_trie("storage", store, empty_root()).unwrap();
        trie.update(b"key", b"value".to_vec());
        trie.update(b"key", Vec::new());
        assert_eq!(trie.get(b"key"), None);
    }

    #[test]
    fn commit_then_reopen_preserves_contents() {
        let store = MemStore::new_mem();
        let mut trie = Trie::new_secure_trie("account", store.clone(), empty_root()).unwrap();
        trie.update(b"account1", b"hello".to_vec());
        trie.update(b"account2", b"world".to_vec());
        let root = trie.commit();

        let reopened = Trie::new_secure_trie("account", store, root).unwrap();
        assert_eq!(reopened.get(b"account1"), Some(b"hello".to_vec()));
        assert_eq!(reopened.get(b"account2"), Some(b"world".to_vec()));
    }

    #[test]
    fn deleting_the_only_key_returns_to_the_empty_root() {
        let store = MemStore::new_mem();
        let mut trie = Trie::new_secure_trie("account", store, empty_root()).unwrap();
        trie.update(b"solo", b"value".to_vec());
        trie.update(b"solo", Vec::new());
        assert_eq!(trie.commit(), empty_root());
    }
}
