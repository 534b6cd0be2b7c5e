//! Columnar field-tree storage.
//!
//! A destination container is a directory. Field-tree `name` lives in
//! `<dir>/<name>.parquet`; while an import is running it is written to
//! `<dir>/<name>.parquet.tmp` and only renamed into place on commit.

use std::{
    fs::{self, File},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use arrow::{
    array::{Array, ArrayRef, AsArray},
    compute::concat_batches,
    datatypes::{
        DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, SchemaRef,
        UInt8Type, UInt16Type, UInt32Type, UInt64Type,
    },
    error::ArrowError,
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder},
    errors::ParquetError,
};
use tree2arrow_arrow::{ENTRY_COLUMN, arrow_schema_to_field_defs, is_entry_field};
use tree2arrow_core::{FieldDefs, Value};

use crate::{error::ImportError, options::WriteOptions};

const EXTENSION: &str = "parquet";

fn committed_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{EXTENSION}"))
}

fn temporary_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{EXTENSION}.tmp"))
}

/// Names of all committed field-trees in `dir`, sorted.
pub fn list_field_trees(dir: impl AsRef<Path>) -> Result<Vec<String>, ImportError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Exclusive writer for one field-tree.
///
/// Dropping a writer that was never committed removes its temporary file, so
/// a failed import leaves nothing under the field-tree name.
pub struct FieldTreeWriter {
    name: String,
    tmp_path: PathBuf,
    final_path: PathBuf,
    inner: Option<ArrowWriter<File>>,
    entries: u64,
    committed: bool,
}

impl FieldTreeWriter {
    pub fn create(
        dir: impl AsRef<Path>,
        name: &str,
        schema: SchemaRef,
        options: &WriteOptions,
    ) -> Result<Self, ImportError> {
        let dir = dir.as_ref();
        let final_path = committed_path(dir, name);
        if final_path.exists() {
            return Err(ImportError::FieldTreeExists {
                dir: dir.to_path_buf(),
                name: name.to_string(),
            });
        }
        let props = options.writer_properties()?;
        fs::create_dir_all(dir)?;

        let tmp_path = temporary_path(dir, name);
        let file = File::create(&tmp_path)?;
        let mut writer = Self {
            name: name.to_string(),
            tmp_path,
            final_path,
            inner: None,
            entries: 0,
            committed: false,
        };
        writer.inner = Some(ArrowWriter::try_new(file, schema, Some(props))?);
        tracing::debug!(field_tree = name, path = %writer.tmp_path.display(), "field-tree writer opened");
        Ok(writer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries written so far.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn write(&mut self, batch: &RecordBatch) -> Result<(), ImportError> {
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| ParquetError::General("field-tree writer already closed".into()))?;
        inner.write(batch)?;
        self.entries += batch.num_rows() as u64;
        Ok(())
    }

    /// Finalize the file and move it into place. Returns the entry count.
    pub fn commit(mut self) -> Result<u64, ImportError> {
        if let Some(inner) = self.inner.take() {
            inner.close()?;
        }
        if self.final_path.exists() {
            return Err(ImportError::FieldTreeExists {
                dir: self
                    .final_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
                name: self.name.clone(),
            });
        }
        fs::rename(&self.tmp_path, &self.final_path)?;
        self.committed = true;
        tracing::debug!(
            field_tree = %self.name,
            entries = self.entries,
            path = %self.final_path.display(),
            "field-tree committed"
        );
        Ok(self.entries)
    }
}

impl Drop for FieldTreeWriter {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.inner.take());
        if let Err(err) = fs::remove_file(&self.tmp_path)
            && err.kind() != ErrorKind::NotFound
        {
            tracing::warn!(
                path = %self.tmp_path.display(),
                error = %err,
                "failed to remove uncommitted field-tree"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Read-back access to a committed field-tree.
pub struct FieldTreeReader {
    path: PathBuf,
    field_defs: FieldDefs,
    batch: RecordBatch,
}

impl FieldTreeReader {
    pub fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, ImportError> {
        let dir = dir.as_ref();
        let path = committed_path(dir, name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ImportError::FieldTreeNotFound {
                    dir: dir.to_path_buf(),
                    name: name.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let batches = builder
            .build()?
            .collect::<Result<Vec<_>, ArrowError>>()?;
        let batch = concat_batches(&schema, &batches)?;
        let field_defs = arrow_schema_to_field_defs(&schema)?;

        Ok(Self {
            path,
            field_defs,
            batch,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored Arrow schema, including the entry column if one was written.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn entry_count(&self) -> u64 {
        self.batch.num_rows() as u64
    }

    /// Field schema without the entry column.
    pub fn field_defs(&self) -> &FieldDefs {
        &self.field_defs
    }

    pub fn has_entry_column(&self) -> bool {
        self.batch
            .schema()
            .fields()
            .first()
            .is_some_and(|f| is_entry_field(f))
    }

    /// Source entry index of each row. Rows are stored in source order, so
    /// without an entry column row `i` is entry `i`.
    pub fn entry_indices(&self) -> Result<Vec<u64>, ImportError> {
        if !self.has_entry_column() {
            return Ok((0..self.entry_count()).collect());
        }
        let indices = self
            .batch
            .column(0)
            .as_primitive_opt::<UInt64Type>()
            .ok_or_else(|| ArrowError::SchemaError(format!("{ENTRY_COLUMN} is not UInt64")))?;
        Ok(indices.values().to_vec())
    }

    /// Whole column at a dotted path such as `branch.a`.
    pub fn column(&self, path: &str) -> Result<ArrayRef, ImportError> {
        let not_found = || ImportError::FieldNotFound {
            path: path.to_string(),
        };
        let mut segments = path.split('.');
        let first = segments.next().ok_or_else(not_found)?;
        let index = self
            .batch
            .schema()
            .fields()
            .iter()
            .position(|f| f.name() == first && !is_entry_field(f))
            .ok_or_else(not_found)?;
        let mut current = self.batch.column(index).clone();
        for segment in segments {
            let record = current.as_struct_opt().ok_or_else(not_found)?;
            let child = record.column_by_name(segment).ok_or_else(not_found)?.clone();
            current = child;
        }
        Ok(current)
    }

    /// Value of the field at `path` for the given entry.
    pub fn value(&self, path: &str, entry: u64) -> Result<Value, ImportError> {
        let count = self.entry_count();
        if entry >= count {
            return Err(ImportError::EntryOutOfRange { entry, count });
        }
        let column = self.column(path)?;
        Ok(array_value(column.as_ref(), entry as usize)?)
    }
}

fn array_value(array: &dyn Array, row: usize) -> Result<Value, ArrowError> {
    Ok(match array.data_type() {
        DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
        DataType::Int8 => Value::I8(array.as_primitive::<Int8Type>().value(row)),
        DataType::Int16 => Value::I16(array.as_primitive::<Int16Type>().value(row)),
        DataType::Int32 => Value::I32(array.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => Value::I64(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::U8(array.as_primitive::<UInt8Type>().value(row)),
        DataType::UInt16 => Value::U16(array.as_primitive::<UInt16Type>().value(row)),
        DataType::UInt32 => Value::U32(array.as_primitive::<UInt32Type>().value(row)),
        DataType::UInt64 => Value::U64(array.as_primitive::<UInt64Type>().value(row)),
        DataType::Float32 => Value::F32(array.as_primitive::<Float32Type>().value(row)),
        DataType::Float64 => Value::F64(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Value::string(array.as_string::<i32>().value(row)),
        DataType::FixedSizeList(_, _) => {
            let items = array.as_fixed_size_list().value(row);
            Value::Array(
                (0..items.len())
                    .map(|i| array_value(items.as_ref(), i))
                    .collect::<Result<_, _>>()?,
            )
        }
        DataType::Struct(_) => Value::Struct(
            array
                .as_struct()
                .columns()
                .iter()
                .map(|child| array_value(child.as_ref(), row))
                .collect::<Result<_, _>>()?,
        ),
        other => {
            return Err(ArrowError::NotYetImplemented(format!(
                "reading {other} values from a field-tree"
            )));
        }
    })
}
