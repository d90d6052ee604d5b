use dexio_primitives::Hash;

/// Failures raised by trie node storage and retrieval.
#[derive(Debug, thiserror::Error)]
pub enum TrieError {
    /// A child reference pointed at a hash with no corresponding node in the
    /// backing store.
    #[error("trie node {0} not found in store")]
    NodeNotFound(Hash),
    /// A stored node's RLP encoding did not have the 2- or 17-item shape a
    /// leaf/extension/branch requires.
    #[error("corrupt trie node encoding")]
    CorruptNode,
    /// Propagated RLP decode failure.
    #[error("RLP error decoding trie node: {0}")]
    Rlp(#[from] alloy_rlp::Error),
}
