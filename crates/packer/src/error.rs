use dexio_primitives::Hash;

/// Failures raised while scheduling a new [`crate::Flow`] or finalizing one
/// with [`crate::Flow::pack`] (§4.2, §7).
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// Propagated from the authority scheduler (`NotAuthorized`,
    /// `NoActiveProposers`, `SeedUnavailable`).
    #[error(transparent)]
    Scheduler(#[from] dexio_poa::SchedulerError),
    /// Propagated state-engine failure while opening the parent's state or
    /// reading the params registry.
    #[error(transparent)]
    State(#[from] dexio_state::StateError),
    /// This node's own candidate entry (needed to resolve an implicit
    /// beneficiary) is not registered in the authority registry.
    #[error("no explicit beneficiary was given and this node has no registered candidate")]
    NoImplicitBeneficiary,
    /// The signing key handed to `pack` does not correspond to the block's
    /// scheduled signer.
    #[error("signing key does not recover to the scheduled signer")]
    SignerMismatch,
    /// The supplied private key bytes are not a valid secp256k1 scalar.
    #[error("invalid signing key")]
    InvalidKey,
}

/// Failures raised while admitting a transaction into a [`crate::Flow`]
/// (§4.2, §7). Every variant other than [`AdoptError::GasLimitExceeded`]
/// and [`AdoptError::NotAdoptableNow`] is permanent: the Flow's state is
/// guaranteed unchanged.
#[derive(Debug, thiserror::Error)]
pub enum AdoptError {
    /// Adopting this transaction would push the block over its gas limit.
    /// The caller should close the block rather than retry this tx here.
    #[error("adopting this transaction would exceed the remaining block gas budget")]
    GasLimitExceeded,
    /// The transaction cannot be adopted into *this* block but may become
    /// adoptable later (it depends on a transaction not yet seen, or its
    /// validity window has not opened yet) — the mempool should retain it.
    #[error("transaction is not adoptable in this block yet: {0}")]
    NotAdoptableNow(NotAdoptableReason),
    /// The transaction can never be adopted and should be dropped.
    #[error("transaction is permanently rejected: {0}")]
    Rejected(RejectReason),
    /// Propagated state-engine failure during clause execution.
    #[error(transparent)]
    State(#[from] dexio_state::StateError),
    /// Propagated runtime failure while dispatching a clause. Malformed
    /// native call data is reported as a reverted clause, not this variant
    /// (see [`dexio_evm::VmError::MalformedCallData`]); contract creation is
    /// already filtered out above before execution begins, so in practice
    /// this only surfaces a state-engine failure.
    #[error(transparent)]
    Runtime(#[from] dexio_evm::RuntimeError),
}

/// Why a transaction was deemed not-yet-adoptable (§4.2, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotAdoptableReason {
    /// The transaction's `block_ref` floor has not been reached yet.
    #[error("transaction's block_ref floor has not been reached yet")]
    TooEarly,
    /// `depends_on` names a transaction this flow has not adopted yet.
    #[error("dependency {0} has not been adopted in this block")]
    DependencyNotMet(Hash),
}

/// Why a transaction was permanently rejected (§4.2, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// The transaction's `chain_tag` does not match this chain's.
    #[error("chain tag mismatch")]
    ChainTagMismatch,
    /// The transaction's validity window has closed.
    #[error("transaction has expired")]
    Expired,
    /// The same transaction ID was already adopted into this block.
    #[error("duplicate transaction in this block")]
    Replay,
    /// One of the transaction's clauses was a contract-creation clause,
    /// which the native-only runtime cannot execute (§1, §6).
    #[error("contract creation is not supported by the native-only runtime")]
    ContractCreationUnsupported,
    /// The origin's balance cannot cover the sum of every clause's value.
    #[error("origin balance cannot cover the transaction's total clause value")]
    InsufficientBalance,
}
