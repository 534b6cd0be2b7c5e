//! Mapping from source leaf descriptors to target data types.
//!
//! | Source leaf                     | Target `DataTypeDef`              |
//! |---------------------------------|-----------------------------------|
//! | `O`                             | `Bool`                            |
//! | `B` / `S` / `I` / `G`, `L`      | `I8` / `I16` / `I32` / `I64`      |
//! | `b` / `s` / `i` / `g`, `l`      | `U8` / `U16` / `U32` / `U64`      |
//! | `F` / `D`                       | `F32` / `F64`                     |
//! | `C` scalar                      | `String`                          |
//! | `C` with dimensions             | `Array(I8, n)` per dimension      |
//! | other type with dimensions      | `Array(T, n)` per dimension       |
//! | `f`, `d`, variable dimensions   | unsupported                       |
//!
//! Every dimension must fit an Arrow list length (`i32`), and the packed
//! width of the whole array must fit `usize`.

use tree2arrow_core::{DataTypeDef, LeafDef, LeafShape, LeafType};

use crate::error::UnsupportedType;

pub(crate) const ARRAY_SIZE_OVERFLOW: &str = "array size overflows";

/// Map one leaf to its target data type.
pub fn map_leaf(leaf: &LeafDef) -> Result<DataTypeDef, UnsupportedType> {
    let unsupported = |reason: String| UnsupportedType {
        leaf: leaf.to_string(),
        reason,
    };

    match &leaf.shape {
        LeafShape::Variable(count) => Err(unsupported(format!(
            "variable-length array sized by leaf '{count}'"
        ))),
        LeafShape::Scalar if leaf.leaf_type == LeafType::CString => Ok(DataTypeDef::String),
        LeafShape::Scalar => scalar_type_def(leaf.leaf_type)
            .ok_or_else(|| unsupported(format!("no columnar type for {}", leaf.leaf_type))),
        LeafShape::Fixed(dims) => {
            if dims.contains(&0) {
                return Err(unsupported("zero-length dimension".to_string()));
            }
            let element = match leaf.leaf_type {
                LeafType::CString => DataTypeDef::I8,
                other => scalar_type_def(other)
                    .ok_or_else(|| unsupported(format!("no columnar type for {other}")))?,
            };
            if dims.iter().any(|&n| i32::try_from(n).is_err()) {
                return Err(unsupported(ARRAY_SIZE_OVERFLOW.to_string()));
            }
            let data_type = dims
                .iter()
                .rev()
                .fold(element, |inner, &n| DataTypeDef::Array(Box::new(inner), n));
            match data_type.fixed_width() {
                Some(_) => Ok(data_type),
                None => Err(unsupported(ARRAY_SIZE_OVERFLOW.to_string())),
            }
        }
    }
}

/// Same-width scalar target type of a source element type, if one exists.
pub fn scalar_type_def(leaf_type: LeafType) -> Option<DataTypeDef> {
    Some(match leaf_type {
        LeafType::Bool => DataTypeDef::Bool,
        LeafType::Char => DataTypeDef::I8,
        LeafType::UChar => DataTypeDef::U8,
        LeafType::Short => DataTypeDef::I16,
        LeafType::UShort => DataTypeDef::U16,
        LeafType::Int => DataTypeDef::I32,
        LeafType::UInt => DataTypeDef::U32,
        LeafType::Long | LeafType::Long64 => DataTypeDef::I64,
        LeafType::ULong | LeafType::ULong64 => DataTypeDef::U64,
        LeafType::Float => DataTypeDef::F32,
        LeafType::Double => DataTypeDef::F64,
        LeafType::CString | LeafType::Float16 | LeafType::Double32 => return None,
    })
}
