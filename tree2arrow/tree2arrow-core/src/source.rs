//! Source-side descriptors and the row-source contract.
//!
//! A source tree is an ordered list of [`BranchDef`]s. Each branch owns one or
//! more [`LeafDef`]s; a branch with several leaves is a leaf-list whose leaves
//! are packed contiguously in every entry.

use std::fmt;

use crate::error::SourceError;

/// Element type of a source leaf, identified by its one-character type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafType {
    /// `O`
    Bool,
    /// `B`: signed 8-bit character.
    Char,
    /// `b`
    UChar,
    /// `S`
    Short,
    /// `s`
    UShort,
    /// `I`
    Int,
    /// `i`
    UInt,
    /// `G`
    Long,
    /// `g`
    ULong,
    /// `L`
    Long64,
    /// `l`
    ULong64,
    /// `F`
    Float,
    /// `D`
    Double,
    /// `C`: null-terminated character sequence.
    CString,
    /// `f`: truncated float stored in 4 bytes.
    Float16,
    /// `d`: truncated double stored in 8 bytes.
    Double32,
}

impl LeafType {
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'O' => Self::Bool,
            'B' => Self::Char,
            'b' => Self::UChar,
            'S' => Self::Short,
            's' => Self::UShort,
            'I' => Self::Int,
            'i' => Self::UInt,
            'G' => Self::Long,
            'g' => Self::ULong,
            'L' => Self::Long64,
            'l' => Self::ULong64,
            'F' => Self::Float,
            'D' => Self::Double,
            'C' => Self::CString,
            'f' => Self::Float16,
            'd' => Self::Double32,
            _ => return None,
        })
    }

    pub fn code(&self) -> char {
        match self {
            Self::Bool => 'O',
            Self::Char => 'B',
            Self::UChar => 'b',
            Self::Short => 'S',
            Self::UShort => 's',
            Self::Int => 'I',
            Self::UInt => 'i',
            Self::Long => 'G',
            Self::ULong => 'g',
            Self::Long64 => 'L',
            Self::ULong64 => 'l',
            Self::Float => 'F',
            Self::Double => 'D',
            Self::CString => 'C',
            Self::Float16 => 'f',
            Self::Double32 => 'd',
        }
    }

    /// On-disk size of one element in bytes. Characters of a C string count
    /// one byte each.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Char | Self::UChar | Self::CString => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float | Self::Float16 => 4,
            Self::Long | Self::ULong | Self::Long64 | Self::ULong64 | Self::Double => 8,
            Self::Double32 => 8,
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "Bool_t",
            Self::Char => "Char_t",
            Self::UChar => "UChar_t",
            Self::Short => "Short_t",
            Self::UShort => "UShort_t",
            Self::Int => "Int_t",
            Self::UInt => "UInt_t",
            Self::Long => "Long_t",
            Self::ULong => "ULong_t",
            Self::Long64 => "Long64_t",
            Self::ULong64 => "ULong64_t",
            Self::Float => "Float_t",
            Self::Double => "Double_t",
            Self::CString => "char*",
            Self::Float16 => "Float16_t",
            Self::Double32 => "Double32_t",
        };
        f.write_str(name)
    }
}

/// Multiplicity of a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafShape {
    Scalar,
    /// Static dimensions, outermost first (`x[2][3]` is `Fixed(vec![2, 3])`).
    Fixed(Vec<usize>),
    /// Array sized per entry by another leaf (`x[n]`).
    Variable(String),
}

impl LeafShape {
    /// Number of elements per entry, `None` for variable shapes and counts
    /// that overflow `usize`.
    pub fn element_count(&self) -> Option<usize> {
        match self {
            LeafShape::Scalar => Some(1),
            LeafShape::Fixed(dims) => dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)),
            LeafShape::Variable(_) => None,
        }
    }
}

/// Named scalar or array member of a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafDef {
    pub name: String,
    pub leaf_type: LeafType,
    pub shape: LeafShape,
}

impl LeafDef {
    pub fn new(name: impl Into<String>, leaf_type: LeafType, shape: LeafShape) -> Self {
        Self {
            name: name.into(),
            leaf_type,
            shape,
        }
    }

    pub fn scalar(name: impl Into<String>, leaf_type: LeafType) -> Self {
        Self::new(name, leaf_type, LeafShape::Scalar)
    }

    /// Bytes one entry of this leaf occupies, or `None` when the size varies
    /// per entry (C strings and variable arrays) or overflows `usize`.
    pub fn fixed_size(&self) -> Option<usize> {
        if self.leaf_type == LeafType::CString && self.shape == LeafShape::Scalar {
            return None;
        }
        self.shape
            .element_count()?
            .checked_mul(self.leaf_type.size())
    }
}

impl fmt::Display for LeafDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match &self.shape {
            LeafShape::Scalar => {}
            LeafShape::Fixed(dims) => {
                for d in dims {
                    write!(f, "[{d}]")?;
                }
            }
            LeafShape::Variable(count) => write!(f, "[{count}]")?,
        }
        write!(f, "/{}", self.leaf_type.code())
    }
}

/// Named unit of data in a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDef {
    pub name: String,
    pub leaves: Vec<LeafDef>,
}

impl BranchDef {
    pub fn new(name: impl Into<String>, leaves: Vec<LeafDef>) -> Self {
        Self {
            name: name.into(),
            leaves,
        }
    }

    /// Branch holding a single leaf named after the branch.
    pub fn single(name: impl Into<String>, leaf_type: LeafType, shape: LeafShape) -> Self {
        let name = name.into();
        let leaf = LeafDef::new(name.clone(), leaf_type, shape);
        Self::new(name, vec![leaf])
    }

    pub fn is_leaf_list(&self) -> bool {
        self.leaves.len() > 1
    }

    /// Leaf-list title, e.g. `a/I:b[2]/F`.
    pub fn title(&self) -> String {
        self.leaves
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Per-entry raw buffers, one per branch, refilled in place for every entry.
#[derive(Debug, Default, Clone)]
pub struct RawEntry {
    buffers: Vec<Vec<u8>>,
}

impl RawEntry {
    pub fn with_branches(n: usize) -> Self {
        Self {
            buffers: vec![Vec::new(); n],
        }
    }

    pub fn branch_count(&self) -> usize {
        self.buffers.len()
    }

    /// Raw little-endian bytes of branch `index` for the current entry.
    pub fn branch(&self, index: usize) -> &[u8] {
        self.buffers.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Clear and return the buffer of branch `index` for refilling,
    /// growing the entry if needed.
    pub fn branch_mut(&mut self, index: usize) -> &mut Vec<u8> {
        if index >= self.buffers.len() {
            self.buffers.resize(index + 1, Vec::new());
        }
        let buf = &mut self.buffers[index];
        buf.clear();
        buf
    }
}

/// Row-oriented source of entries.
///
/// Implementations enumerate branch descriptors once and yield raw branch
/// bytes entry by entry.
pub trait RowSource {
    /// Name of the tree inside its container.
    fn tree_name(&self) -> &str;

    /// Branch descriptors in declaration order.
    fn branches(&self) -> &[BranchDef];

    /// Number of entries in the tree.
    fn entry_count(&self) -> u64;

    /// Load entry `index` into `entry`, one buffer per branch in
    /// [`branches`](Self::branches) order.
    fn read_entry(&mut self, index: u64, entry: &mut RawEntry) -> Result<(), SourceError>;
}
