/// Failures raised by the account/storage state engine.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Propagated trie failure (corrupt node, missing hash).
    #[error(transparent)]
    Trie(#[from] dexio_trie::TrieError),
    /// A persisted account or storage value did not RLP-decode.
    #[error("failed to decode persisted state: {0}")]
    Decode(#[from] alloy_rlp::Error),
    /// A balance subtraction would have gone negative.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// The balance actually held.
        have: dexio_primitives::BigInt,
        /// The amount the caller attempted to subtract.
        need: dexio_primitives::BigInt,
    },
}
