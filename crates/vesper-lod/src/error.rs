//! LOD error types.

/// Errors raised by screen metric computation and LOD group editing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodError {
    /// An argument violated the operation's contract (missing distance, non-positive size).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The operation is not defined for the given camera or state.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// A level or renderer index was outside the current arena.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
