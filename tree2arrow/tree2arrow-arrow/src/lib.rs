//! Arrow integration layer for `tree2arrow`.
//!
//! This crate covers the three steps between a row-store tree and a columnar
//! field-tree:
//! 1. Map each source leaf to a target type ([`map_leaf`]).
//! 2. Translate a whole branch list into a target schema
//!    ([`translate_branches`]), collecting every issue before failing.
//! 3. Copy raw entries into Arrow `RecordBatch`es ([`EntryCopier`]).
//!
//! Batches hold exactly the translated fields. An [`EntryCopier`] built with
//! [`EntryCopier::with_entry_column`] additionally prepends the
//! [`ENTRY_COLUMN`] system column.
//!
//! # Typical Flow
//! ```rust
//! use tree2arrow_arrow::{EntryCopier, TranslateOptions, translate_branches};
//! use tree2arrow_core::{BranchDef, LeafShape, LeafType, RawEntry};
//!
//! let branches = vec![BranchDef::single("x", LeafType::Int, LeafShape::Scalar)];
//! let schema = translate_branches(&branches, &TranslateOptions::default()).unwrap();
//! let mut copier = EntryCopier::new(&schema).unwrap();
//!
//! let mut entry = RawEntry::with_branches(1);
//! entry.branch_mut(0).extend_from_slice(&42i32.to_le_bytes());
//! copier.append_entry(0, &entry).unwrap();
//!
//! let batch = copier.finish_batch().unwrap();
//! assert_eq!(batch.num_rows(), 1);
//! ```
pub mod entry_copy;
pub mod error;
pub mod schema_convert;
pub mod translate;
pub mod type_map;

/// Re-export of [`entry_copy::EntryCopier`].
pub use entry_copy::EntryCopier;
/// Re-exports from [`error`].
pub use error::{CopyError, SchemaIssue, TranslateError, UnsupportedType};
/// Re-exports from [`schema_convert`].
pub use schema_convert::{
    ENTRY_COLUMN, SYSTEM_COLUMN_KEY, arrow_schema_to_field_defs, entry_field,
    field_defs_to_arrow_schema, is_entry_field, with_entry_field,
};
/// Re-exports from [`translate`].
pub use translate::{TranslateOptions, TranslatedSchema, translate_branches};
/// Re-exports from [`type_map`].
pub use type_map::{map_leaf, scalar_type_def};
