//! Import row-store trees into columnar field-trees.
//!
//! [`Importer`] drives one import: it translates the source branch list into
//! a field schema, copies every entry in order, and commits the result as a
//! named field-tree of a destination container.
//!
//! ```no_run
//! use tree2arrow::Importer;
//!
//! # fn main() -> Result<(), tree2arrow::ImportError> {
//! let mut importer = Importer::create("events.t2a", "events", "out")?;
//! importer.set_field_tree_name("events")?;
//! let entries = importer.import()?;
//! println!("imported {entries} entries");
//! # Ok(())
//! # }
//! ```

mod error;
mod importer;
mod options;
pub mod store;

pub use error::ImportError;
pub use importer::{ImportProgress, Importer, ProgressCallback, SessionState};
pub use options::{Compression, WriteOptions};
pub use store::{FieldTreeReader, FieldTreeWriter, list_field_trees};
pub use tree2arrow_arrow as arrow;
pub use tree2arrow_core as core;
pub use tree2arrow_rowstore as rowstore;
