//! Arrow-independent schema intermediate representation of a field-tree.

mod format;
mod types;

pub use format::format_field_defs;
pub use types::{DataTypeDef, FieldDef, FieldDefs};
