//! Checks for UI form definitions under `UI/`.

use crate::ast::SourceNode;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::validation::schema::{accept, CheckResult, DocumentSchema};

/// Files this validator applies to.
pub const UI_FILE_PATTERN: &str = r"^UI/.*\.yaml$";

pub const FIELD_TYPES: &[&str] = &[
    "string",
    "boolean",
    "text",
    "integer",
    "password",
    "clusterip",
    "floatingip",
    "domain",
    "databaselist",
    "table",
    "flavor",
    "keypair",
    "image",
    "azone",
    "psqlDatabase",
];

const BOOLEAN_KEYS: &[&str] = &["required", "hidden"];

const STRING_KEYS: &[&str] = &["name", "label", "description", "helpText"];

pub fn ui_schema() -> DocumentSchema<'static> {
    let mut schema = DocumentSchema::new();
    schema
        .add_checker("Forms", check_forms, false)
        .add_checker("Templates", accept, false)
        .add_checker("Application", accept, false)
        .add_checker("Version", accept, false);
    schema
}

pub fn validate_ui(document: &SourceNode) -> Vec<Diagnostic> {
    ui_schema().validate(document)
}

fn malformed(detail: impl Into<String>, node: &SourceNode) -> Diagnostic {
    Diagnostic::at(
        DiagnosticKind::MalformedForm {
            detail: detail.into(),
        },
        node,
    )
}

/// `Forms` is a list of single-key mappings `{form name: {fields: [...]}}`.
fn check_forms(value: &SourceNode) -> CheckResult {
    let Some(forms) = value.as_sequence() else {
        return Ok(vec![malformed("Forms should be a list", value)]);
    };

    let mut diagnostics = Vec::new();
    for named_form in forms {
        let Some([(name, form)]) = named_form.as_mapping() else {
            diagnostics.push(malformed("each form should be a single-key mapping", named_form));
            continue;
        };

        match form.get("fields") {
            Some(fields) => check_fields(fields, &mut diagnostics),
            None => diagnostics.push(malformed(format!("form \"{}\" has no fields", name), form)),
        }
    }
    Ok(diagnostics)
}

fn check_fields(fields: &SourceNode, out: &mut Vec<Diagnostic>) {
    let Some(fields) = fields.as_sequence() else {
        out.push(malformed("fields should be a list", fields));
        return;
    };

    for field in fields {
        let Some(entries) = field.as_mapping() else {
            out.push(malformed("field should be a mapping", field));
            continue;
        };

        for (key, value) in entries {
            let Some(key_name) = key.as_str() else {
                continue;
            };

            if key_name == "type" {
                let known = value.as_str().is_some_and(|kind| FIELD_TYPES.contains(&kind));
                if !known {
                    out.push(Diagnostic::at(
                        DiagnosticKind::InvalidFieldType {
                            value: value.to_string(),
                        },
                        value,
                    ));
                }
            } else if BOOLEAN_KEYS.contains(&key_name) {
                if value.as_bool().is_none() {
                    out.push(Diagnostic::at(
                        DiagnosticKind::NotABoolean {
                            key: key_name.to_string(),
                            value: value.to_string(),
                        },
                        key,
                    ));
                }
            } else if STRING_KEYS.contains(&key_name) && value.as_str().is_none() {
                out.push(Diagnostic::at(
                    DiagnosticKind::NotAString {
                        value: value.to_string(),
                    },
                    value,
                ));
            }
        }
    }
}
