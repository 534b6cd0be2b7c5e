//! Error types shared by row sources and value accessors.

/// Error returned by [`RowSource`](crate::RowSource) implementations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error while reading the underlying container.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The requested entry does not exist.
    #[error("entry {index} out of range for tree '{tree}' with {count} entries")]
    EntryOutOfRange { tree: String, index: u64, count: u64 },

    /// Entry bytes are truncated or otherwise malformed.
    #[error("corrupt entry {index} in tree '{tree}': {detail}")]
    Corrupt {
        tree: String,
        index: u64,
        detail: String,
    },
}

/// Error returned when a [`Value`](crate::Value) accessor is called on a
/// different variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: String,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
