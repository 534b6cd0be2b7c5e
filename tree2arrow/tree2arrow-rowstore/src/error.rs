//! Error types for the row-store container.

use tree2arrow_core::SourceError;

/// Errors produced while reading or writing a row-store container.
#[derive(Debug, thiserror::Error)]
pub enum RowStoreError {
    /// I/O error while opening, mapping, or writing a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file does not start with the row-store magic bytes.
    #[error("{path} is not a row-store container")]
    BadMagic { path: String },

    /// Header or entry data is truncated or inconsistent.
    #[error("corrupt row-store container: {detail}")]
    Corrupt { detail: String },

    /// The requested tree was not found in the container.
    #[error("tree '{tree}' not found in {path}")]
    TreeNotFound { tree: String, path: String },

    /// A leaf-list title could not be parsed.
    #[error("invalid leaf-list title '{title}': {detail}")]
    Title { title: String, detail: String },

    /// Two branches of one tree share a name.
    #[error("duplicate branch '{branch}' in tree '{tree}'")]
    DuplicateBranch { tree: String, branch: String },

    /// Two trees of one container share a name.
    #[error("duplicate tree '{tree}'")]
    DuplicateTree { tree: String },

    /// A filled entry does not match the branch layout.
    #[error("entry does not match branch '{branch}' of tree '{tree}': {detail}")]
    EntryShape {
        tree: String,
        branch: String,
        detail: String,
    },

    /// The branch layout cannot be stored (e.g. a C string inside a leaf-list).
    #[error("unsupported layout for branch '{branch}': {detail}")]
    UnsupportedLayout { branch: String, detail: String },
}

impl RowStoreError {
    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        Self::Corrupt {
            detail: detail.into(),
        }
    }
}

pub(crate) fn into_source_error(tree: &str, index: u64, err: RowStoreError) -> SourceError {
    match err {
        RowStoreError::Io(e) => SourceError::Io(e),
        other => SourceError::Corrupt {
            tree: tree.to_string(),
            index,
            detail: other.to_string(),
        },
    }
}
