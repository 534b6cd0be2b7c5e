use std::{mem::size_of, sync::Arc};

use arrow::{
    array::{
        ArrayRef, BooleanBuilder, FixedSizeListArray, PrimitiveBuilder, StringBuilder, StructArray,
    },
    datatypes::{
        ArrowPrimitiveType, FieldRef, Fields, Float32Type, Float64Type, Int8Type, Int16Type,
        Int32Type, Int64Type, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
    },
    error::ArrowError,
};
use tree2arrow_core::{DataTypeDef, FieldDefs};

use crate::{
    error::CopyError,
    schema_convert::{arrow_fields, item_field},
};

/// Transfers one field's raw bytes into a columnar builder.
pub(super) trait ColumnCopier: Send {
    /// Byte width of one value, `None` for strings.
    fn width(&self) -> Option<usize>;

    fn append(&mut self, raw: &[u8]) -> Result<(), CopyError>;

    /// Drain everything appended so far into an array.
    fn finish(&mut self) -> Result<ArrayRef, ArrowError>;
}

macro_rules! primitive {
    ($path:expr, $arrow:ty, $native:ty) => {
        Box::new(PrimitiveCopier::<$arrow>::new($path, |raw| {
            raw.try_into().ok().map(<$native>::from_le_bytes)
        }))
    };
}

/// Build the copier for `data_type`; `path` names the field in errors.
pub(super) fn make_copier(
    path: String,
    data_type: &DataTypeDef,
) -> Result<Box<dyn ColumnCopier>, CopyError> {
    let copier: Box<dyn ColumnCopier> = match data_type {
        DataTypeDef::Bool => Box::new(BoolCopier::new(path)),
        DataTypeDef::I8 => primitive!(path, Int8Type, i8),
        DataTypeDef::I16 => primitive!(path, Int16Type, i16),
        DataTypeDef::I32 => primitive!(path, Int32Type, i32),
        DataTypeDef::I64 => primitive!(path, Int64Type, i64),
        DataTypeDef::U8 => primitive!(path, UInt8Type, u8),
        DataTypeDef::U16 => primitive!(path, UInt16Type, u16),
        DataTypeDef::U32 => primitive!(path, UInt32Type, u32),
        DataTypeDef::U64 => primitive!(path, UInt64Type, u64),
        DataTypeDef::F32 => primitive!(path, Float32Type, f32),
        DataTypeDef::F64 => primitive!(path, Float64Type, f64),
        DataTypeDef::String => Box::new(StringCopier::new(path)),
        DataTypeDef::Array(elem, size) => {
            let item = make_copier(format!("{path}[]"), elem)?;
            let Some(item_width) = item.width() else {
                return Err(CopyError::UnsupportedLayout { field: path });
            };
            let width = item_width.checked_mul(*size);
            let list_size = i32::try_from(*size).ok();
            let (Some(width), Some(list_size)) = (width, list_size) else {
                return Err(CopyError::SizeOverflow { field: path });
            };
            Box::new(FixedArrayCopier {
                path,
                item_field: item_field(elem)?,
                list_size,
                item_width,
                width,
                item,
            })
        }
        DataTypeDef::Struct(fields) => Box::new(RecordCopier::new(path, fields)?),
    };
    Ok(copier)
}

fn check_size(path: &str, expected: usize, raw: &[u8]) -> Result<(), CopyError> {
    if raw.len() == expected {
        Ok(())
    } else {
        Err(CopyError::BufferSize {
            field: path.to_string(),
            expected,
            actual: raw.len(),
        })
    }
}

struct PrimitiveCopier<T: ArrowPrimitiveType> {
    path: String,
    builder: PrimitiveBuilder<T>,
    decode: fn(&[u8]) -> Option<T::Native>,
}

impl<T: ArrowPrimitiveType> PrimitiveCopier<T> {
    fn new(path: String, decode: fn(&[u8]) -> Option<T::Native>) -> Self {
        Self {
            path,
            builder: PrimitiveBuilder::new(),
            decode,
        }
    }
}

impl<T: ArrowPrimitiveType> ColumnCopier for PrimitiveCopier<T> {
    fn width(&self) -> Option<usize> {
        Some(size_of::<T::Native>())
    }

    fn append(&mut self, raw: &[u8]) -> Result<(), CopyError> {
        let value = (self.decode)(raw).ok_or_else(|| CopyError::BufferSize {
            field: self.path.clone(),
            expected: size_of::<T::Native>(),
            actual: raw.len(),
        })?;
        self.builder.append_value(value);
        Ok(())
    }

    fn finish(&mut self) -> Result<ArrayRef, ArrowError> {
        Ok(Arc::new(self.builder.finish()))
    }
}

struct BoolCopier {
    path: String,
    builder: BooleanBuilder,
}

impl BoolCopier {
    fn new(path: String) -> Self {
        Self {
            path,
            builder: BooleanBuilder::new(),
        }
    }
}

impl ColumnCopier for BoolCopier {
    fn width(&self) -> Option<usize> {
        Some(1)
    }

    fn append(&mut self, raw: &[u8]) -> Result<(), CopyError> {
        check_size(&self.path, 1, raw)?;
        self.builder.append_value(raw[0] != 0);
        Ok(())
    }

    fn finish(&mut self) -> Result<ArrayRef, ArrowError> {
        Ok(Arc::new(self.builder.finish()))
    }
}

/// Null-terminated character data; the length is measured on every entry.
struct StringCopier {
    path: String,
    builder: StringBuilder,
}

impl StringCopier {
    fn new(path: String) -> Self {
        Self {
            path,
            builder: StringBuilder::new(),
        }
    }
}

impl ColumnCopier for StringCopier {
    fn width(&self) -> Option<usize> {
        None
    }

    fn append(&mut self, raw: &[u8]) -> Result<(), CopyError> {
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let text = std::str::from_utf8(&raw[..len]).map_err(|_| CopyError::InvalidUtf8 {
            field: self.path.clone(),
        })?;
        self.builder.append_value(text);
        Ok(())
    }

    fn finish(&mut self) -> Result<ArrayRef, ArrowError> {
        Ok(Arc::new(self.builder.finish()))
    }
}

struct FixedArrayCopier {
    path: String,
    item_field: FieldRef,
    list_size: i32,
    item_width: usize,
    width: usize,
    item: Box<dyn ColumnCopier>,
}

impl ColumnCopier for FixedArrayCopier {
    fn width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn append(&mut self, raw: &[u8]) -> Result<(), CopyError> {
        check_size(&self.path, self.width, raw)?;
        for chunk in raw.chunks_exact(self.item_width) {
            self.item.append(chunk)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<ArrayRef, ArrowError> {
        let values = self.item.finish()?;
        Ok(Arc::new(FixedSizeListArray::try_new(
            self.item_field.clone(),
            self.list_size,
            values,
            None,
        )?))
    }
}

/// Leaf-list members packed back to back in declaration order.
struct RecordCopier {
    path: String,
    fields: Fields,
    members: Vec<(usize, Box<dyn ColumnCopier>)>,
    width: usize,
}

impl RecordCopier {
    fn new(path: String, children: &FieldDefs) -> Result<Self, CopyError> {
        let mut members = Vec::with_capacity(children.len());
        let mut offset: usize = 0;
        for child in children.iter() {
            let copier = make_copier(format!("{path}.{}", child.name), &child.data_type)?;
            let Some(width) = copier.width() else {
                return Err(CopyError::UnsupportedLayout {
                    field: format!("{path}.{}", child.name),
                });
            };
            members.push((offset, copier));
            offset = offset
                .checked_add(width)
                .ok_or_else(|| CopyError::SizeOverflow { field: path.clone() })?;
        }
        Ok(Self {
            path,
            fields: arrow_fields(children)?,
            members,
            width: offset,
        })
    }
}

impl ColumnCopier for RecordCopier {
    fn width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn append(&mut self, raw: &[u8]) -> Result<(), CopyError> {
        check_size(&self.path, self.width, raw)?;
        for (offset, member) in &mut self.members {
            let width = member.width().unwrap_or_default();
            member.append(&raw[*offset..*offset + width])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<ArrayRef, ArrowError> {
        let arrays = self
            .members
            .iter_mut()
            .map(|(_, member)| member.finish())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(StructArray::try_new(
            self.fields.clone(),
            arrays,
            None,
        )?))
    }
}
