use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};
use tree2arrow_arrow::{
    ENTRY_COLUMN, arrow_schema_to_field_defs, field_defs_to_arrow_schema, is_entry_field,
    with_entry_field,
};
use tree2arrow_core::{DataTypeDef, FieldDef, FieldDefs};

fn sample_fields() -> FieldDefs {
    vec![
        FieldDef::new("b", DataTypeDef::Bool),
        FieldDef::new("i8", DataTypeDef::I8),
        FieldDef::new("u64", DataTypeDef::U64),
        FieldDef::new("f64", DataTypeDef::F64),
        FieldDef::new("s", DataTypeDef::String),
        FieldDef::new("arr", DataTypeDef::Array(Box::new(DataTypeDef::F32), 3)),
        FieldDef::new(
            "rec",
            DataTypeDef::Struct(
                vec![
                    FieldDef::new("x", DataTypeDef::I32),
                    FieldDef::new("y", DataTypeDef::Array(Box::new(DataTypeDef::U16), 2)),
                ]
                .into(),
            ),
        ),
    ]
    .into()
}

#[test]
fn field_defs_to_arrow_schema_converts_nested_types() {
    let schema = field_defs_to_arrow_schema(&sample_fields()).unwrap();

    assert_eq!(schema.fields().len(), 7);
    assert_eq!(schema.field(0).data_type(), &DataType::Boolean);
    assert_eq!(schema.field(4).data_type(), &DataType::Utf8);
    assert!(schema.fields().iter().all(|f| !f.is_nullable()));
    assert_eq!(
        schema.field(5).data_type(),
        &DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, false)), 3)
    );
    assert_eq!(
        schema.field(6).data_type(),
        &DataType::Struct(
            vec![
                Field::new("x", DataType::Int32, false),
                Field::new(
                    "y",
                    DataType::FixedSizeList(
                        Arc::new(Field::new("item", DataType::UInt16, false)),
                        2
                    ),
                    false
                ),
            ]
            .into()
        )
    );
}

#[test]
fn with_entry_field_prepends_system_column() {
    let schema = field_defs_to_arrow_schema(&sample_fields()).unwrap();
    let schema = with_entry_field(schema).unwrap();
    assert_eq!(schema.field(0).name(), ENTRY_COLUMN);
    assert_eq!(schema.field(0).data_type(), &DataType::UInt64);
    assert!(is_entry_field(schema.field(0)));
    assert_eq!(schema.field(1).name(), "b");
}

#[test]
fn arrow_schema_to_field_defs_restores_ir_without_entry_column() {
    let fields = sample_fields();
    let plain = field_defs_to_arrow_schema(&fields).unwrap();
    assert_eq!(arrow_schema_to_field_defs(&plain).unwrap(), fields);

    let stored = with_entry_field(plain).unwrap();
    assert_eq!(arrow_schema_to_field_defs(&stored).unwrap(), fields);
}

#[test]
fn at_prefixed_data_fields_are_not_hidden() {
    let fields: FieldDefs = vec![
        FieldDef::new("@entry", DataTypeDef::U64),
        FieldDef::new("@x", DataTypeDef::I32),
    ]
    .into();
    let schema = field_defs_to_arrow_schema(&fields).unwrap();
    assert!(!is_entry_field(schema.field(0)));
    assert_eq!(arrow_schema_to_field_defs(&schema).unwrap(), fields);
    assert!(with_entry_field(schema).is_err());
}

#[test]
fn array_lengths_beyond_i32_are_rejected() {
    let fields: FieldDefs = vec![FieldDef::new(
        "a",
        DataTypeDef::Array(Box::new(DataTypeDef::U8), i32::MAX as usize + 1),
    )]
    .into();
    assert!(field_defs_to_arrow_schema(&fields).is_err());
}

#[test]
fn arrow_schema_to_field_defs_rejects_foreign_types() {
    let schema = Schema::new(vec![Field::new("d", DataType::Date32, false)]);
    assert!(arrow_schema_to_field_defs(&schema).is_err());
}
