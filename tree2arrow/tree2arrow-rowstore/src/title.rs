//! Leaf-list title parser using nom parser combinators.
//!
//! A title describes the leaves of one branch, separated by `:`:
//!
//! ```text
//! title     := leaf (':' leaf)*
//! leaf      := name dimension* ('/' type_code)?
//! dimension := '[' (integer | name) ']'
//! ```
//!
//! A missing type code defaults to `F` (`Float_t`). A dimension given by name
//! refers to a count leaf and yields [`LeafShape::Variable`].

use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit1, satisfy},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
};
use tree2arrow_core::{LeafDef, LeafShape, LeafType};

use crate::error::RowStoreError;

enum Dimension {
    Static(usize),
    Count(String),
}

struct RawLeaf<'a> {
    name: &'a str,
    dims: Vec<Dimension>,
    code: Option<char>,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'),
    ))(input)
}

fn dimension(input: &str) -> IResult<&str, Dimension> {
    delimited(
        char('['),
        alt((
            map_res(digit1, |d: &str| d.parse::<usize>().map(Dimension::Static)),
            map(identifier, |name: &str| Dimension::Count(name.to_string())),
        )),
        char(']'),
    )(input)
}

fn type_code(input: &str) -> IResult<&str, char> {
    preceded(char('/'), satisfy(|c| c.is_ascii_alphanumeric()))(input)
}

fn leaf(input: &str) -> IResult<&str, RawLeaf<'_>> {
    map(
        tuple((identifier, many0(dimension), opt(type_code))),
        |(name, dims, code)| RawLeaf { name, dims, code },
    )(input)
}

/// Parse a leaf-list title such as `a/I:b[2]/F` into leaf descriptors.
pub fn parse_title(title: &str) -> Result<Vec<LeafDef>, RowStoreError> {
    let title_err = |detail: String| RowStoreError::Title {
        title: title.to_string(),
        detail,
    };

    let (_, raw_leaves) = all_consuming(separated_list1(char(':'), leaf))(title.trim())
        .map_err(|e| title_err(e.to_string()))?;

    let mut leaves = Vec::with_capacity(raw_leaves.len());
    for raw in raw_leaves {
        let code = raw.code.unwrap_or('F');
        let leaf_type = LeafType::from_code(code)
            .ok_or_else(|| title_err(format!("unknown type code '{code}' for leaf '{}'", raw.name)))?;
        leaves.push(LeafDef::new(raw.name, leaf_type, shape_of(raw.dims)));
    }
    Ok(leaves)
}

fn shape_of(dims: Vec<Dimension>) -> LeafShape {
    if dims.is_empty() {
        return LeafShape::Scalar;
    }
    let mut sizes = Vec::with_capacity(dims.len());
    for dim in dims {
        match dim {
            Dimension::Static(n) => sizes.push(n),
            Dimension::Count(name) => return LeafShape::Variable(name),
        }
    }
    LeafShape::Fixed(sizes)
}
