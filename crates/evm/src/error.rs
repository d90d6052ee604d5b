/// Failures raised while preparing a clause for execution (§6, §7).
///
/// A failure here means the clause never ran at all — distinct from a
/// [`crate::VmError`], which is a recoverable failure *during* execution
/// that still consumes gas and still finalizes normally. Malformed native
/// call data is a [`crate::VmError`], not a variant here: the wire layout
/// mismatch is discovered only once dispatch has already begun, so it is
/// reported as a reverted clause rather than aborting the whole clause
/// loop.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Contract-creation clauses (`to = None`) have no code to run: a
    /// bytecode interpreter is out of scope (§1).
    #[error("contract creation is not supported by the native-only runtime")]
    ContractCreationUnsupported,
    /// Propagated state-engine failure.
    #[error(transparent)]
    State(#[from] dexio_state::StateError),
}
