//! Arrow-independent core types and the row-source contract for `tree2arrow`.
//!
//! This crate provides the source descriptors ([`BranchDef`] / [`LeafDef`]),
//! the target schema IR ([`FieldDefs`] / [`DataTypeDef`]), the read-back
//! [`Value`], and the [`RowSource`] trait implemented by row-store readers.

mod error;
mod schema;
mod source;
mod value;

pub use error::{SourceError, ValueTypeError};
pub use schema::{DataTypeDef, FieldDef, FieldDefs, format_field_defs};
pub use source::{BranchDef, LeafDef, LeafShape, LeafType, RawEntry, RowSource};
pub use value::Value;
