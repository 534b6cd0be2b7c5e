//! Translation of a source branch list into a target field tree.
//!
//! Translation is a single order-preserving pass. Every problem is collected
//! and reported together; a schema is only produced when no issue was found.

use std::collections::HashMap;

use tree2arrow_core::{BranchDef, DataTypeDef, FieldDef, FieldDefs, LeafDef};

use crate::{
    error::{SchemaIssue, TranslateError, UnsupportedType},
    type_map::{ARRAY_SIZE_OVERFLOW, map_leaf},
};

/// Options controlling branch-to-field translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Replace `.` in branch and leaf names with `_` instead of rejecting
    /// them. Dots are reserved for addressing record children.
    pub convert_dots: bool,
}

/// Target schema produced from a branch list.
///
/// Top-level field `i` is always fed by source branch `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedSchema {
    fields: FieldDefs,
    branch_names: Vec<String>,
}

impl TranslatedSchema {
    pub fn fields(&self) -> &FieldDefs {
        &self.fields
    }

    /// Source branch names, in field order.
    pub fn branch_names(&self) -> &[String] {
        &self.branch_names
    }

    pub fn into_fields(self) -> FieldDefs {
        self.fields
    }
}

/// Translate `branches` into a target schema.
///
/// - single-leaf branches become top-level leaf fields named after the branch;
/// - leaf-lists become records whose children are the leaves in order.
pub fn translate_branches(
    branches: &[BranchDef],
    options: &TranslateOptions,
) -> Result<TranslatedSchema, TranslateError> {
    let mut issues = Vec::new();
    let mut fields = Vec::with_capacity(branches.len());
    let mut seen: HashMap<String, String> = HashMap::with_capacity(branches.len());

    for branch in branches {
        let name = field_name(&branch.name, &branch.name, options, &mut issues);
        let data_type = match branch.leaves.as_slice() {
            [] => {
                issues.push(SchemaIssue::UnsupportedType {
                    branch: branch.name.clone(),
                    source: UnsupportedType {
                        leaf: branch.name.clone(),
                        reason: "branch has no leaves".to_string(),
                    },
                });
                None
            }
            [leaf] => map_leaf(leaf)
                .map_err(|source| {
                    issues.push(SchemaIssue::UnsupportedType {
                        branch: branch.name.clone(),
                        source,
                    })
                })
                .ok(),
            leaves => translate_leaf_list(branch, leaves, options, &mut issues),
        };

        let Some(name) = name else {
            continue;
        };
        if let Some(first) = seen.insert(name.clone(), branch.name.clone()) {
            issues.push(SchemaIssue::Conflict {
                path: name.clone(),
                first,
                second: branch.name.clone(),
            });
        }
        if let Some(data_type) = data_type {
            fields.push(FieldDef::new(name, data_type));
        }
    }

    if !issues.is_empty() {
        tracing::debug!(issues = issues.len(), "schema translation rejected");
        return Err(TranslateError { issues });
    }

    tracing::debug!(fields = fields.len(), "schema translated");
    Ok(TranslatedSchema {
        fields: fields.into(),
        branch_names: branches.iter().map(|b| b.name.clone()).collect(),
    })
}

fn translate_leaf_list(
    branch: &BranchDef,
    leaves: &[LeafDef],
    options: &TranslateOptions,
    issues: &mut Vec<SchemaIssue>,
) -> Option<DataTypeDef> {
    let before = issues.len();
    let mut children: Vec<FieldDef> = Vec::with_capacity(leaves.len());

    for leaf in leaves {
        let Some(name) = field_name(&branch.name, &leaf.name, options, issues) else {
            continue;
        };
        if children.iter().any(|c| c.name == name) {
            issues.push(SchemaIssue::Conflict {
                path: format!("{}.{name}", branch.name),
                first: branch.name.clone(),
                second: branch.name.clone(),
            });
            continue;
        }

        let data_type = match map_leaf(leaf) {
            Ok(dt) => dt,
            Err(source) => {
                issues.push(SchemaIssue::UnsupportedType {
                    branch: branch.name.clone(),
                    source,
                });
                continue;
            }
        };
        if data_type.fixed_width().is_none() {
            issues.push(SchemaIssue::UnsupportedType {
                branch: branch.name.clone(),
                source: UnsupportedType {
                    leaf: leaf.to_string(),
                    reason: "leaf-list members must have a fixed size".to_string(),
                },
            });
            continue;
        }
        children.push(FieldDef::new(name, data_type));
    }

    if issues.len() != before {
        return None;
    }
    let record = DataTypeDef::Struct(children.into());
    if record.fixed_width().is_none() {
        issues.push(SchemaIssue::UnsupportedType {
            branch: branch.name.clone(),
            source: UnsupportedType {
                leaf: branch.title(),
                reason: ARRAY_SIZE_OVERFLOW.to_string(),
            },
        });
        return None;
    }
    Some(record)
}

/// Validate `raw` as a field name, applying dot conversion when enabled.
fn field_name(
    branch: &str,
    raw: &str,
    options: &TranslateOptions,
    issues: &mut Vec<SchemaIssue>,
) -> Option<String> {
    let name = if options.convert_dots {
        raw.replace('.', "_")
    } else {
        raw.to_string()
    };

    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains('.') {
        Some("'.' is reserved for record paths")
    } else {
        None
    };

    match reason {
        Some(reason) => {
            issues.push(SchemaIssue::InvalidName {
                branch: branch.to_string(),
                name,
                reason,
            });
            None
        }
        None => Some(name),
    }
}
