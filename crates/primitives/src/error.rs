/// Errors shared across the primitive value types (e.g. fixed-length byte
/// slices that turned out to be the wrong length).
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum PrimitivesError {
    /// A byte slice did not match an expected fixed length.
    #[error("expected a {expected}-byte value, got {actual}")]
    InvalidLength {
        /// The expected length, in bytes.
        expected: usize,
        /// The length actually observed.
        actual: usize,
    },
}
