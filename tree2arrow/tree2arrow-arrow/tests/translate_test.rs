use tree2arrow_arrow::{SchemaIssue, TranslateOptions, translate_branches};
use tree2arrow_core::{BranchDef, DataTypeDef, FieldDef, FieldDefs, LeafDef, LeafShape, LeafType};

fn scalar(name: &str, leaf_type: LeafType) -> BranchDef {
    BranchDef::single(name, leaf_type, LeafShape::Scalar)
}

#[test]
fn translate_branches_keeps_branch_order() {
    let branches = vec![
        scalar("z", LeafType::Double),
        scalar("a", LeafType::Int),
        BranchDef::single("m", LeafType::Short, LeafShape::Fixed(vec![2])),
    ];
    let schema = translate_branches(&branches, &TranslateOptions::default()).unwrap();

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["z", "a", "m"]);
    assert_eq!(schema.branch_names(), ["z", "a", "m"]);
    assert_eq!(
        schema.fields().find("m").unwrap().data_type,
        DataTypeDef::Array(Box::new(DataTypeDef::I16), 2)
    );
}

#[test]
fn translate_branches_turns_leaf_lists_into_records() {
    let branch = BranchDef::new(
        "branch",
        vec![
            LeafDef::scalar("a", LeafType::Int),
            LeafDef::scalar("b", LeafType::Float),
        ],
    );
    let schema = translate_branches(&[branch], &TranslateOptions::default()).unwrap();

    let expected = FieldDefs::from(vec![FieldDef::new(
        "branch",
        DataTypeDef::Struct(
            vec![
                FieldDef::new("a", DataTypeDef::I32),
                FieldDef::new("b", DataTypeDef::F32),
            ]
            .into(),
        ),
    )]);
    assert_eq!(schema.fields(), &expected);
    assert_eq!(
        schema.fields().find("branch.b").unwrap().data_type,
        DataTypeDef::F32
    );
    assert!(schema.fields().find("branch.c").is_none());
}

#[test]
fn translate_branches_of_empty_list_is_empty_schema() {
    let schema = translate_branches(&[], &TranslateOptions::default()).unwrap();
    assert!(schema.fields().is_empty());
}

#[test]
fn translate_branches_reports_duplicate_names_as_conflict() {
    let branches = vec![scalar("x", LeafType::Int), scalar("x", LeafType::Float)];
    let err = translate_branches(&branches, &TranslateOptions::default()).unwrap_err();
    assert!(err.has_conflicts());
    assert_eq!(err.issues.len(), 1);
}

#[test]
fn translate_branches_reports_duplicate_leaves_as_conflict() {
    let branch = BranchDef::new(
        "r",
        vec![
            LeafDef::scalar("a", LeafType::Int),
            LeafDef::scalar("a", LeafType::Int),
        ],
    );
    let err = translate_branches(&[branch], &TranslateOptions::default()).unwrap_err();
    assert!(matches!(
        &err.issues[..],
        [SchemaIssue::Conflict { path, .. }] if path == "r.a"
    ));
}

#[test]
fn translate_branches_collects_all_issues_before_failing() {
    let branches = vec![
        scalar("ok", LeafType::Int),
        scalar("half", LeafType::Float16),
        BranchDef::single("var", LeafType::Int, LeafShape::Variable("ok".to_string())),
        scalar("ok", LeafType::Double),
    ];
    let err = translate_branches(&branches, &TranslateOptions::default()).unwrap_err();

    assert_eq!(err.issues.len(), 3, "{err}");
    assert!(err.has_unsupported_types());
    assert!(err.has_conflicts());
    let text = err.to_string();
    assert!(text.contains("half"), "{text}");
    assert!(text.contains("var"), "{text}");
}

#[test]
fn translate_branches_rejects_cstring_inside_leaf_list() {
    let branch = BranchDef::new(
        "r",
        vec![
            LeafDef::scalar("n", LeafType::Int),
            LeafDef::scalar("s", LeafType::CString),
        ],
    );
    let err = translate_branches(&[branch], &TranslateOptions::default()).unwrap_err();
    assert!(err.has_unsupported_types());
}

#[test]
fn translate_branches_rejects_reserved_names() {
    let branches = vec![scalar("a.b", LeafType::Int), scalar("", LeafType::Int)];
    let err = translate_branches(&branches, &TranslateOptions::default()).unwrap_err();
    assert_eq!(err.issues.len(), 2);
    assert!(
        err.issues
            .iter()
            .all(|i| matches!(i, SchemaIssue::InvalidName { .. }))
    );
}

#[test]
fn translate_branches_accepts_at_prefixed_names() {
    let branches = vec![scalar("@entry", LeafType::Int), scalar("@t", LeafType::Double)];
    let schema = translate_branches(&branches, &TranslateOptions::default()).unwrap();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["@entry", "@t"]);
}

#[test]
fn translate_branches_reports_array_size_overflow() {
    let branch = BranchDef::new(
        "br",
        vec![
            LeafDef::new("a", LeafType::Int, LeafShape::Fixed(vec![usize::MAX / 2])),
            LeafDef::scalar("b", LeafType::Int),
        ],
    );
    let err = translate_branches(&[branch], &TranslateOptions::default()).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert!(matches!(
        &err.issues[0],
        SchemaIssue::UnsupportedType { branch, source }
            if branch == "br" && source.reason == "array size overflows"
    ));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn translate_branches_reports_record_width_overflow() {
    let huge = || LeafShape::Fixed(vec![i32::MAX as usize, 1 << 29]);
    let branch = BranchDef::new(
        "br",
        vec![
            LeafDef::new("a", LeafType::Double, huge()),
            LeafDef::new("b", LeafType::Double, huge()),
            LeafDef::new("c", LeafType::Double, huge()),
        ],
    );
    let err = translate_branches(&[branch], &TranslateOptions::default()).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert!(matches!(
        &err.issues[0],
        SchemaIssue::UnsupportedType { source, .. } if source.reason == "array size overflows"
    ));
}

#[test]
fn translate_branches_converts_dots_when_enabled() {
    let options = TranslateOptions { convert_dots: true };
    let branches = vec![scalar("px.raw", LeafType::Int)];
    let schema = translate_branches(&branches, &options).unwrap();
    assert_eq!(schema.fields()[0].name, "px_raw");
    assert_eq!(schema.branch_names(), ["px.raw"]);
}

#[test]
fn translate_branches_reports_collisions_made_by_dot_conversion() {
    let options = TranslateOptions { convert_dots: true };
    let branches = vec![scalar("a.b", LeafType::Int), scalar("a_b", LeafType::Int)];
    let err = translate_branches(&branches, &options).unwrap_err();
    assert!(matches!(
        &err.issues[..],
        [SchemaIssue::Conflict { path, first, second }]
            if path == "a_b" && first == "a.b" && second == "a_b"
    ));
}
