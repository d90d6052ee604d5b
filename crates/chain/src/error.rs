use dexio_primitives::Hash;

/// Failures raised by the block repository and chain reader (§4.6, §7).
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A referenced block ID has no corresponding entry in the repository.
    #[error("unknown block: {0}")]
    UnknownBlock(Hash),
    /// The repository has no best block set yet.
    #[error("repository has no best block")]
    NoBestBlock,
}
