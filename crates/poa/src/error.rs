/// Failures raised by the authority scheduler (§4.1, §7).
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum SchedulerError {
    /// `this_node` is not a member of the active proposer set, so it has no
    /// slot to schedule against.
    #[error("this node is not an authorized (active) proposer")]
    NotAuthorized,
    /// No active proposers were supplied at all; no slot exists for anyone.
    #[error("no active proposers to schedule against")]
    NoActiveProposers,
    /// A v2 seed could not be derived because the requested ancestor window
    /// reaches past the chain's genesis.
    #[error("seed could not be derived: ancestor window exceeds available chain")]
    SeedUnavailable,
}
