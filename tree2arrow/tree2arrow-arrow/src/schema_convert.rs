use std::{collections::HashMap, sync::Arc};

use arrow::{
    datatypes::{DataType, Field, FieldRef, Fields, Schema},
    error::ArrowError,
};
use tree2arrow_core::{DataTypeDef, FieldDef, FieldDefs};

/// Optional system column holding the source entry index of every stored row.
pub const ENTRY_COLUMN: &str = "@entry";

/// Field metadata key marking a system column.
pub const SYSTEM_COLUMN_KEY: &str = "tree2arrow.system";

/// Name of the child field of fixed-size list columns.
pub(crate) const ITEM_FIELD: &str = "item";

// ---------------------------------------------------------------------------
// Convert FieldDef schema IR to Arrow schema (without system columns)
// ---------------------------------------------------------------------------

/// Converts `tree2arrow-core` schema IR into an Arrow `Schema`.
///
/// All fields are non-nullable: every entry carries a value for every field.
/// Fails when an array length does not fit an Arrow list length.
pub fn field_defs_to_arrow_schema(fields: &FieldDefs) -> Result<Schema, ArrowError> {
    Ok(Schema::new(arrow_fields(fields)?))
}

pub(crate) fn arrow_fields(fields: &FieldDefs) -> Result<Fields, ArrowError> {
    Ok(fields
        .iter()
        .map(field_def_to_arrow_field)
        .collect::<Result<Vec<_>, _>>()?
        .into())
}

fn field_def_to_arrow_field(f: &FieldDef) -> Result<Field, ArrowError> {
    Ok(Field::new(&f.name, data_type_def_to_arrow(&f.data_type)?, false))
}

pub(crate) fn item_field(elem: &DataTypeDef) -> Result<FieldRef, ArrowError> {
    let item = Field::new(ITEM_FIELD, data_type_def_to_arrow(elem)?, false);
    Ok(Arc::new(item))
}

pub(crate) fn data_type_def_to_arrow(dt: &DataTypeDef) -> Result<DataType, ArrowError> {
    Ok(match dt {
        DataTypeDef::Bool => DataType::Boolean,
        DataTypeDef::I8 => DataType::Int8,
        DataTypeDef::I16 => DataType::Int16,
        DataTypeDef::I32 => DataType::Int32,
        DataTypeDef::I64 => DataType::Int64,
        DataTypeDef::U8 => DataType::UInt8,
        DataTypeDef::U16 => DataType::UInt16,
        DataTypeDef::U32 => DataType::UInt32,
        DataTypeDef::U64 => DataType::UInt64,
        DataTypeDef::F32 => DataType::Float32,
        DataTypeDef::F64 => DataType::Float64,
        DataTypeDef::String => DataType::Utf8,
        DataTypeDef::Array(elem, size) => {
            let size = i32::try_from(*size).map_err(|_| {
                ArrowError::SchemaError(format!("array length {size} exceeds i32"))
            })?;
            DataType::FixedSizeList(item_field(elem)?, size)
        }
        DataTypeDef::Struct(fields) => DataType::Struct(arrow_fields(fields)?),
    })
}

// ---------------------------------------------------------------------------
// Prepend the @entry system column to a schema
// ---------------------------------------------------------------------------

pub fn entry_field() -> Field {
    Field::new(ENTRY_COLUMN, DataType::UInt64, false).with_metadata(HashMap::from([(
        SYSTEM_COLUMN_KEY.to_string(),
        "entry".to_string(),
    )]))
}

/// Whether `field` is the system entry column rather than a data field.
pub fn is_entry_field(field: &Field) -> bool {
    field.name() == ENTRY_COLUMN
        && field.data_type() == &DataType::UInt64
        && field.metadata().get(SYSTEM_COLUMN_KEY).map(String::as_str) == Some("entry")
}

/// Prepend the entry column. Fails if a data field already uses its name.
pub fn with_entry_field(schema: Schema) -> Result<Schema, ArrowError> {
    if schema.field_with_name(ENTRY_COLUMN).is_ok() {
        return Err(ArrowError::SchemaError(format!(
            "field '{ENTRY_COLUMN}' collides with the entry column"
        )));
    }
    let mut fields: Vec<Field> = vec![entry_field()];
    fields.extend(schema.fields().iter().map(|f| f.as_ref().clone()));
    Ok(Schema::new(fields))
}

// ---------------------------------------------------------------------------
// Convert a stored Arrow schema back to FieldDef schema IR
// ---------------------------------------------------------------------------

/// Converts a stored Arrow schema back into schema IR, skipping the entry
/// column if present.
pub fn arrow_schema_to_field_defs(schema: &Schema) -> Result<FieldDefs, ArrowError> {
    let fields = schema
        .fields()
        .iter()
        .filter(|f| !is_entry_field(f))
        .map(|f| arrow_field_to_field_def(f))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(fields.into())
}

fn arrow_field_to_field_def(f: &Field) -> Result<FieldDef, ArrowError> {
    Ok(FieldDef::new(f.name(), arrow_to_data_type_def(f.data_type())?))
}

fn arrow_to_data_type_def(dt: &DataType) -> Result<DataTypeDef, ArrowError> {
    Ok(match dt {
        DataType::Boolean => DataTypeDef::Bool,
        DataType::Int8 => DataTypeDef::I8,
        DataType::Int16 => DataTypeDef::I16,
        DataType::Int32 => DataTypeDef::I32,
        DataType::Int64 => DataTypeDef::I64,
        DataType::UInt8 => DataTypeDef::U8,
        DataType::UInt16 => DataTypeDef::U16,
        DataType::UInt32 => DataTypeDef::U32,
        DataType::UInt64 => DataTypeDef::U64,
        DataType::Float32 => DataTypeDef::F32,
        DataType::Float64 => DataTypeDef::F64,
        DataType::Utf8 => DataTypeDef::String,
        DataType::FixedSizeList(item, size) => {
            let size = usize::try_from(*size).map_err(|_| {
                ArrowError::SchemaError(format!("negative fixed-size list length {size}"))
            })?;
            DataTypeDef::Array(Box::new(arrow_to_data_type_def(item.data_type())?), size)
        }
        DataType::Struct(fields) => DataTypeDef::Struct(
            fields
                .iter()
                .map(|f| arrow_field_to_field_def(f))
                .collect::<Result<Vec<_>, _>>()?
                .into(),
        ),
        other => {
            return Err(ArrowError::SchemaError(format!(
                "unsupported column type in field-tree: {other}"
            )));
        }
    })
}
