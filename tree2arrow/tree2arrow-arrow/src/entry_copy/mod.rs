//! Per-entry transfer of raw branch buffers into Arrow columns.
//!
//! One copier is chosen per top-level field when the [`EntryCopier`] is
//! built; appending an entry never re-inspects field types.

mod column;

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, UInt64Builder},
    datatypes::SchemaRef,
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use tree2arrow_core::RawEntry;

use self::column::{ColumnCopier, make_copier};
use crate::{
    error::CopyError,
    schema_convert::{field_defs_to_arrow_schema, with_entry_field},
    translate::TranslatedSchema,
};

/// Accumulates entries of one translated schema into Arrow record batches.
pub struct EntryCopier {
    schema: SchemaRef,
    entries: Option<UInt64Builder>,
    columns: Vec<Box<dyn ColumnCopier>>,
    pending: usize,
}

impl EntryCopier {
    /// Copier whose batches hold exactly the translated fields.
    pub fn new(translated: &TranslatedSchema) -> Result<Self, CopyError> {
        Self::build(translated, false)
    }

    /// Copier whose batches start with the [`ENTRY_COLUMN`](crate::ENTRY_COLUMN)
    /// system column holding each row's source entry index.
    pub fn with_entry_column(translated: &TranslatedSchema) -> Result<Self, CopyError> {
        Self::build(translated, true)
    }

    fn build(translated: &TranslatedSchema, entry_column: bool) -> Result<Self, CopyError> {
        let fields = translated.fields();
        let columns = fields
            .iter()
            .map(|f| make_copier(f.name.clone(), &f.data_type))
            .collect::<Result<Vec<_>, _>>()?;
        let mut schema = field_defs_to_arrow_schema(fields)?;
        if entry_column {
            schema = with_entry_field(schema)?;
        }

        Ok(Self {
            schema: Arc::new(schema),
            entries: entry_column.then(UInt64Builder::new),
            columns,
            pending: 0,
        })
    }

    /// Output schema; the entry column, when enabled, comes first.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn has_entry_column(&self) -> bool {
        self.entries.is_some()
    }

    /// Copy one entry. Buffer `i` of `entry` feeds field `i`.
    ///
    /// On error the copier holds a partially appended entry and must be
    /// discarded.
    pub fn append_entry(&mut self, index: u64, entry: &RawEntry) -> Result<(), CopyError> {
        if entry.branch_count() != self.columns.len() {
            return Err(CopyError::BranchCount {
                expected: self.columns.len(),
                actual: entry.branch_count(),
            });
        }
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.append(entry.branch(i))?;
        }
        if let Some(entries) = &mut self.entries {
            entries.append_value(index);
        }
        self.pending += 1;
        Ok(())
    }

    /// Number of entries appended since the last [`finish_batch`](Self::finish_batch).
    pub fn len(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the appended entries into a batch and reset the builders.
    pub fn finish_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len() + 1);
        if let Some(entries) = &mut self.entries {
            arrays.push(Arc::new(entries.finish()));
        }
        for column in &mut self.columns {
            arrays.push(column.finish()?);
        }
        let options = RecordBatchOptions::new().with_row_count(Some(self.pending));
        self.pending = 0;
        RecordBatch::try_new_with_options(self.schema.clone(), arrays, &options)
    }
}

impl std::fmt::Debug for EntryCopier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryCopier")
            .field("schema", &self.schema)
            .field("pending", &self.len())
            .finish()
    }
}
