//! Error types for collections and projections.

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Errors raised by collection, batching and projection operations.
///
/// All of these are usage errors: they are reported at the offending call and
/// leave the collection unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// An index was outside the bounds of the collection.
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// `end_update` was called without a matching `begin_update`.
    #[error("end_update called without a matching begin_update")]
    UnmatchedEndUpdate,

    /// The operation is not supported by this collection.
    #[error("Operation '{operation}' is not supported: the collection is derived from its source")]
    NotSupported { operation: &'static str },

    /// The projection has been disposed and can no longer be used.
    #[error("The projection has been disposed")]
    Disposed,
}

impl CollectionError {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a not-supported error for the named operation.
    pub fn not_supported(operation: &'static str) -> Self {
        Self::NotSupported { operation }
    }
}
