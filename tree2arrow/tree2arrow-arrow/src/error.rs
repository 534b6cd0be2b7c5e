use arrow::error::ArrowError;
use thiserror::Error;

/// A source leaf whose type or shape has no columnar mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported type for leaf '{leaf}': {reason}")]
pub struct UnsupportedType {
    pub leaf: String,
    pub reason: String,
}

/// One problem found while translating a branch list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaIssue {
    #[error("branch '{branch}': {source}")]
    UnsupportedType {
        branch: String,
        #[source]
        source: UnsupportedType,
    },
    #[error("field '{path}' is produced by both branch '{first}' and branch '{second}'")]
    Conflict {
        path: String,
        first: String,
        second: String,
    },
    #[error("branch '{branch}': invalid field name '{name}': {reason}")]
    InvalidName {
        branch: String,
        name: String,
        reason: &'static str,
    },
}

/// All issues collected over one translation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema translation failed: {}", format_issues(.issues))]
pub struct TranslateError {
    pub issues: Vec<SchemaIssue>,
}

impl TranslateError {
    pub fn has_conflicts(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, SchemaIssue::Conflict { .. }))
    }

    pub fn has_unsupported_types(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, SchemaIssue::UnsupportedType { .. }))
    }
}

fn format_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("field '{field}': expected {expected} bytes, got {actual}")]
    BufferSize {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("field '{field}': string is not valid UTF-8")]
    InvalidUtf8 { field: String },
    #[error("entry has {actual} branch buffers, schema has {expected} fields")]
    BranchCount { expected: usize, actual: usize },
    #[error("field '{field}' has no fixed width inside a record")]
    UnsupportedLayout { field: String },
    #[error("field '{field}': array size overflows")]
    SizeOverflow { field: String },
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}
