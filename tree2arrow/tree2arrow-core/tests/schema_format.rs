use tree2arrow_core::{DataTypeDef, FieldDef, FieldDefs, format_field_defs};

#[test]
fn record_keeps_type_line_and_indentation() -> Result<(), std::fmt::Error> {
    let fields = vec![FieldDef::new(
        "branch",
        DataTypeDef::Struct(
            vec![
                FieldDef::new("a", DataTypeDef::I32),
                FieldDef::new("b", DataTypeDef::F64),
            ]
            .into(),
        ),
    )];

    let text = format_field_defs(&fields)?;
    let expected = "\
branch:
    type: struct
    fields:
        a: { type: i32 }
        b: { type: f64 }
";
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn fixed_array_prints_item_and_size() -> Result<(), std::fmt::Error> {
    let fields = vec![
        FieldDef::new("myString", DataTypeDef::String),
        FieldDef::new("b", DataTypeDef::Array(Box::new(DataTypeDef::I32), 2)),
    ];

    let text = format_field_defs(&fields)?;
    let expected = "\
myString: { type: string }
b:
    type: array
    item: { type: i32 }
    size: 2
";
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn nested_array_is_rendered_as_block() -> Result<(), std::fmt::Error> {
    let inner = DataTypeDef::Array(Box::new(DataTypeDef::U8), 3);
    let fields = vec![FieldDef::new(
        "grid",
        DataTypeDef::Array(Box::new(inner), 2),
    )];

    let text = format_field_defs(&fields)?;
    let expected = "\
grid:
    type: array
    item:
        type: array
        item: { type: u8 }
        size: 3
    size: 2
";
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn field_defs_display_matches_formatter() -> Result<(), std::fmt::Error> {
    let fields: FieldDefs = vec![FieldDef::new("field_a", DataTypeDef::I32)].into();
    assert_eq!(fields.to_string(), format_field_defs(fields.as_slice())?);
    Ok(())
}
