use std::{
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

/// Arrow-independent data type of a target field.
///
/// Variant names mirror [`Value`](crate::Value) for consistency (values ↔ types).
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeDef {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Variable-length UTF-8 string.
    String,
    /// Fixed-size array of `N` elements.
    Array(Box<DataTypeDef>, usize),
    /// Record whose children are addressed as `parent.child`.
    Struct(FieldDefs),
}

impl DataTypeDef {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, DataTypeDef::Struct(_) | DataTypeDef::Array(_, _))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataTypeDef::Bool => "bool",
            DataTypeDef::I8 => "i8",
            DataTypeDef::I16 => "i16",
            DataTypeDef::I32 => "i32",
            DataTypeDef::I64 => "i64",
            DataTypeDef::U8 => "u8",
            DataTypeDef::U16 => "u16",
            DataTypeDef::U32 => "u32",
            DataTypeDef::U64 => "u64",
            DataTypeDef::F32 => "f32",
            DataTypeDef::F64 => "f64",
            DataTypeDef::String => "string",
            DataTypeDef::Array(_, _) => "array",
            DataTypeDef::Struct(_) => "struct",
        }
    }

    /// Number of bytes one value occupies in a packed little-endian source
    /// buffer, or `None` for variable-length types and widths that overflow
    /// `usize`.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            DataTypeDef::Bool | DataTypeDef::I8 | DataTypeDef::U8 => Some(1),
            DataTypeDef::I16 | DataTypeDef::U16 => Some(2),
            DataTypeDef::I32 | DataTypeDef::U32 | DataTypeDef::F32 => Some(4),
            DataTypeDef::I64 | DataTypeDef::U64 | DataTypeDef::F64 => Some(8),
            DataTypeDef::String => None,
            DataTypeDef::Array(elem, size) => elem.fixed_width()?.checked_mul(*size),
            DataTypeDef::Struct(fields) => fields
                .iter()
                .try_fold(0usize, |acc, f| acc.checked_add(f.data_type.fixed_width()?)),
        }
    }
}

/// Typed collection of [`FieldDef`] used for schema bodies and record members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldDefs(pub Vec<FieldDef>);

impl FieldDefs {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self(fields)
    }

    pub fn as_slice(&self) -> &[FieldDef] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.0.iter()
    }

    /// Resolve a dotted path such as `branch.a` by walking record children
    /// one name segment at a time.
    pub fn find(&self, path: &str) -> Option<&FieldDef> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.iter().find(|f| f.name == first)?;
        for segment in segments {
            let DataTypeDef::Struct(children) = &current.data_type else {
                return None;
            };
            current = children.iter().find(|f| f.name == segment)?;
        }
        Some(current)
    }
}

impl From<Vec<FieldDef>> for FieldDefs {
    fn from(value: Vec<FieldDef>) -> Self {
        Self(value)
    }
}

impl From<FieldDefs> for Vec<FieldDef> {
    fn from(value: FieldDefs) -> Self {
        value.0
    }
}

impl AsRef<[FieldDef]> for FieldDefs {
    fn as_ref(&self) -> &[FieldDef] {
        self.as_slice()
    }
}

impl Deref for FieldDefs {
    type Target = [FieldDef];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl Display for FieldDefs {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = super::format_field_defs(self.as_slice())?;
        f.write_str(&text)
    }
}

/// Named, typed unit of data in a field-tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub data_type: DataTypeDef,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, data_type: DataTypeDef) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}
