//! Typed values read back from a committed field-tree.

use std::sync::Arc;

use crate::error::ValueTypeError;

/// Single field value of one entry.
/// All types are explicit; no lossy conversions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Arc<str>),
    Array(Vec<Value>),
    Struct(Vec<Value>),
}

macro_rules! try_scalar {
    ($fn_name:ident, $variant:ident, $t:ty) => {
        pub fn $fn_name(&self) -> Result<$t, ValueTypeError> {
            match self {
                Value::$variant(v) => Ok(*v),
                _ => Err(self.type_mismatch(stringify!($variant))),
            }
        }
    };
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    try_scalar!(try_bool, Bool, bool);
    try_scalar!(try_i8, I8, i8);
    try_scalar!(try_i16, I16, i16);
    try_scalar!(try_i32, I32, i32);
    try_scalar!(try_i64, I64, i64);
    try_scalar!(try_u8, U8, u8);
    try_scalar!(try_u16, U16, u16);
    try_scalar!(try_u32, U32, u32);
    try_scalar!(try_u64, U64, u64);
    try_scalar!(try_f32, F32, f32);
    try_scalar!(try_f64, F64, f64);

    pub fn try_str(&self) -> Result<&str, ValueTypeError> {
        match self {
            Value::String(v) => Ok(v.as_ref()),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn try_array(&self) -> Result<&[Value], ValueTypeError> {
        match self {
            Value::Array(items) => Ok(items),
            _ => Err(self.type_mismatch("Array")),
        }
    }

    pub fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I8(_) => "I8",
            Value::I16(_) => "I16",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::U8(_) => "U8",
            Value::U16(_) => "U16",
            Value::U32(_) => "U32",
            Value::U64(_) => "U64",
            Value::F32(_) => "F32",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Struct(_) => "Struct",
        }
    }
}
