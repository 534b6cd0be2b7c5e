use std::fmt::{Error, Result, Write as _};

use super::{DataTypeDef, FieldDef};

/// Format field definitions in a readable style:
/// primitive fields are rendered in one line, compound fields are pretty-printed.
/// Nested fields follow the same rule.
pub fn format_field_defs(fields: impl AsRef<[FieldDef]>) -> std::result::Result<String, Error> {
    let fields = fields.as_ref();
    let mut out = String::new();

    for field in fields.iter() {
        format_labeled_type(&field.name, &field.data_type, 0, &mut out)?;
    }

    Ok(out)
}

fn format_data_type(data_type: &DataTypeDef, indent: usize, out: &mut String) -> Result {
    let pad = " ".repeat(indent);
    writeln!(out, "{pad}type: {}", data_type.type_name())?;

    match data_type {
        DataTypeDef::Struct(fields) => {
            writeln!(out, "{pad}fields:")?;
            for child in fields.iter() {
                format_labeled_type(&child.name, &child.data_type, indent + 4, out)?;
            }
        }
        DataTypeDef::Array(elem, size) => {
            format_labeled_type("item", elem, indent, out)?;
            writeln!(out, "{pad}size: {size}")?;
        }
        _ => unreachable!("{data_type:?} is not a compound type"),
    }

    Ok(())
}

fn format_labeled_type(
    label: &str,
    data_type: &DataTypeDef,
    indent: usize,
    out: &mut String,
) -> Result {
    let pad = " ".repeat(indent);
    if data_type.is_primitive() {
        writeln!(out, "{pad}{label}: {{ type: {} }}", data_type.type_name())?;
    } else {
        writeln!(out, "{pad}{label}:")?;
        format_data_type(data_type, indent + 4, out)?;
    }
    Ok(())
}
