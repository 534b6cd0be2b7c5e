use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, Int32Array, UInt64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use tree2arrow::{FieldTreeReader, FieldTreeWriter, ImportError, WriteOptions, list_field_trees};
use tree2arrow_arrow::entry_field;
use tree2arrow_core::{DataTypeDef, FieldDef, Value};

fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![Field::new("x", DataType::Int32, false)]))
}

fn batch(values: &[i32]) -> RecordBatch {
    let xs: ArrayRef = Arc::new(Int32Array::from(values.to_vec()));
    RecordBatch::try_new(schema(), vec![xs]).unwrap()
}

#[test]
fn commit_moves_the_temporary_file_into_place() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer =
        FieldTreeWriter::create(dir.path(), "t", schema(), &WriteOptions::default()).unwrap();
    assert_eq!(writer.name(), "t");
    assert!(dir.path().join("t.parquet.tmp").exists());
    assert!(list_field_trees(dir.path()).unwrap().is_empty());

    writer.write(&batch(&[3, 4, 5])).unwrap();
    assert_eq!(writer.entries(), 3);
    assert_eq!(writer.commit().unwrap(), 3);

    assert!(!dir.path().join("t.parquet.tmp").exists());
    assert_eq!(list_field_trees(dir.path()).unwrap(), vec!["t".to_string()]);

    let reader = FieldTreeReader::open(dir.path(), "t").unwrap();
    assert_eq!(
        reader.field_defs().as_slice(),
        &[FieldDef::new("x", DataTypeDef::I32)]
    );
    assert_eq!(reader.value("x", 2).unwrap(), Value::I32(5));
    assert_eq!(reader.column("x").unwrap().len(), 3);
}

#[test]
fn dropped_writer_leaves_no_field_tree() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut writer =
            FieldTreeWriter::create(dir.path(), "t", schema(), &WriteOptions::default()).unwrap();
        writer.write(&batch(&[1])).unwrap();
    }
    assert!(!dir.path().join("t.parquet.tmp").exists());
    assert!(!dir.path().join("t.parquet").exists());
    assert!(matches!(
        FieldTreeReader::open(dir.path(), "t"),
        Err(ImportError::FieldTreeNotFound { .. })
    ));
}

#[test]
fn create_refuses_an_existing_field_tree() {
    let dir = tempfile::tempdir().unwrap();
    FieldTreeWriter::create(dir.path(), "t", schema(), &WriteOptions::default())
        .unwrap()
        .commit()
        .unwrap();

    assert!(matches!(
        FieldTreeWriter::create(dir.path(), "t", schema(), &WriteOptions::default()),
        Err(ImportError::FieldTreeExists { .. })
    ));
}

#[test]
fn entry_column_is_hidden_from_fields() {
    let dir = tempfile::tempdir().unwrap();
    let schema = Arc::new(Schema::new(vec![
        entry_field(),
        Field::new("x", DataType::Int32, false),
    ]));
    let entries: ArrayRef = Arc::new(UInt64Array::from(vec![10, 11]));
    let xs: ArrayRef = Arc::new(Int32Array::from(vec![1, 2]));
    let batch = RecordBatch::try_new(schema.clone(), vec![entries, xs]).unwrap();

    let mut writer =
        FieldTreeWriter::create(dir.path(), "t", schema, &WriteOptions::default()).unwrap();
    writer.write(&batch).unwrap();
    writer.commit().unwrap();

    let reader = FieldTreeReader::open(dir.path(), "t").unwrap();
    assert!(reader.has_entry_column());
    assert_eq!(
        reader.field_defs().as_slice(),
        &[FieldDef::new("x", DataTypeDef::I32)]
    );
    assert_eq!(reader.entry_indices().unwrap(), vec![10, 11]);
    assert!(matches!(
        reader.column("@entry"),
        Err(ImportError::FieldNotFound { .. })
    ));
}

#[test]
fn without_entry_column_rows_map_to_entries_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer =
        FieldTreeWriter::create(dir.path(), "t", schema(), &WriteOptions::default()).unwrap();
    writer.write(&batch(&[7, 8, 9])).unwrap();
    writer.commit().unwrap();

    let reader = FieldTreeReader::open(dir.path(), "t").unwrap();
    assert!(!reader.has_entry_column());
    assert_eq!(reader.schema().fields().len(), 1);
    assert_eq!(reader.entry_indices().unwrap(), vec![0, 1, 2]);
}
