//! Row-oriented tree container for `tree2arrow`.
//!
//! A container file holds one or more named trees. Each tree is a list of
//! branches described by leaf-list titles and a sequence of entries stored
//! row by row.
//!
//! - [`RowStoreWriter`] / [`TreeBuilder`] produce containers.
//! - [`RowStoreFile`] opens a container; [`TreeReader`] reads one tree and
//!   implements [`tree2arrow_core::RowSource`].
//! - [`parse_title`] parses leaf-list titles such as `a/I:b[2]/F`.

mod error;
mod format;
mod reader;
mod title;
mod writer;

pub use error::RowStoreError;
pub use reader::{RowStoreFile, TreeReader};
pub use title::parse_title;
pub use writer::{RowStoreWriter, TreeBuilder};
