//! The transaction/receipts root helper (§6: "Merkle root of individually
//! RLP-encoded [items]").
//!
//! Reuses the same secure-trie abstraction the account/storage engine is
//! built on rather than a bespoke binary Merkle tree: an ephemeral trie,
//! keyed by each item's RLP-encoded index, is populated and immediately
//! committed. This is the same shape `dexio_state::State` uses for a
//! per-account storage sub-trie, just thrown away after `commit()`.

use dexio_primitives::Hash;
use dexio_trie::{MemStore, Trie};

/// The root of a fresh trie mapping `rlp(index)` to `item` for every item in
/// `encoded_items`, in order. Returns [`dexio_trie::empty_root`] for an
/// empty slice.
pub fn ordered_merkle_root(encoded_items: &[Vec<u8>]) -> Hash {
    if encoded_items.is_empty() {
        return dexio_trie::empty_root();
    }
    let store = MemStore::new_mem();
    let mut trie = Trie::new_secure_trie("merkle-scratch", store, dexio_trie::empty_root())
        .expect("a brand-new trie over an empty root never fails to open");
    for (index, item) in encoded_items.iter().enumerate() {
        let key = alloy_rlp::encode(index as u64);
        trie.update(&key, item.clone());
    }
    trie.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_yields_the_empty_root() {
        assert_eq!(ordered_merkle_root(&[]), dexio_trie::empty_root());
    }

    #[test]
    fn root_is_deterministic_and_order_sensitive() {
        let a = vec![b"one".to_vec(), b"two".to_vec()];
        let b = vec![b"two".to_vec(), b"one".to_vec()];
        assert_eq!(ordered_merkle_root(&a), ordered_merkle_root(&a));
        assert_ne!(ordered_merkle_root(&a), ordered_merkle_root(&b));
    }

    #[test]
    fn root_changes_with_any_item() {
        let a = vec![b"one".to_vec(), b"two".to_vec()];
        let b = vec![b"one".to_vec(), b"THREE".to_vec()];
        assert_ne!(ordered_merkle_root(&a), ordered_merkle_root(&b));
    }
}
