//! Error types for the importer and the field-tree store.

use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use tree2arrow_arrow::{CopyError, TranslateError};
use tree2arrow_core::SourceError;
use tree2arrow_rowstore::RowStoreError;

/// Errors produced by [`Importer`](crate::Importer) and the [`store`](crate::store) types.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// `import()` was called before a field-tree name was set.
    #[error("no destination field-tree name set")]
    DestinationNameMissing,

    /// The field-tree name cannot be used as a file name in the container.
    #[error("invalid field-tree name '{name}'")]
    InvalidFieldTreeName { name: String },

    /// The session already imported successfully.
    #[error("import already completed ({entries} entries)")]
    AlreadyImported { entries: u64 },

    /// A previous import on this session failed; sessions are single-shot.
    #[error("import already attempted and failed")]
    AlreadyAttempted,

    /// Unsupported types or conflicting names in the source schema.
    #[error(transparent)]
    Schema(#[from] TranslateError),

    /// The source container or tree could not be opened.
    #[error("cannot open tree '{tree}' in {path}: {source}")]
    OpenSource {
        path: PathBuf,
        tree: String,
        #[source]
        source: RowStoreError,
    },

    /// The destination already holds a committed field-tree with this name.
    #[error("field-tree '{name}' already exists in {dir}")]
    FieldTreeExists { dir: PathBuf, name: String },

    /// The named field-tree does not exist in the destination.
    #[error("field-tree '{name}' not found in {dir}")]
    FieldTreeNotFound { dir: PathBuf, name: String },

    /// Reading an entry from the source failed.
    #[error("reading entry {entry} failed: {source}")]
    Source {
        entry: u64,
        #[source]
        source: SourceError,
    },

    /// Transferring an entry into columns failed.
    #[error("copying entry {entry} failed: {source}")]
    Copy {
        entry: u64,
        #[source]
        source: CopyError,
    },

    /// A dotted path does not name a field of the field-tree.
    #[error("field '{path}' not found")]
    FieldNotFound { path: String },

    /// The requested entry is past the end of the field-tree.
    #[error("entry {entry} out of range ({count} entries)")]
    EntryOutOfRange { entry: u64, count: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Parquet(#[from] ParquetError),
}
