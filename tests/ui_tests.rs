// tests/ui_tests.rs

mod common;

use common::{yaml, UI_FORMS};
use mplcheck::validation::ui::validate_ui;
use mplcheck::Diagnostic;

fn form_with_field(extra: &str) -> Vec<Diagnostic> {
    let text = format!(
        "Forms:\n  - name1:\n      fields:\n        - name: whatever\n          label: sth\n          description: something\n{}",
        extra
    );
    validate_ui(&yaml(&text))
}

#[test]
fn valid_forms() {
    assert!(validate_ui(&yaml(UI_FORMS)).is_empty());
    assert!(form_with_field("          type: integer\n").is_empty());
}

#[test]
fn unknown_field_type() {
    let diagnostics = form_with_field("          type: int\n");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Wrong type of field \"int\"");
    assert_eq!(diagnostics[0].code, "E080");
}

#[test]
fn required_and_hidden_must_be_booleans() {
    let diagnostics = form_with_field("          type: integer\n          required: 2\n          hidden: 'yes'\n");
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "Value of required should be boolean not \"2\"",
            "Value of hidden should be boolean not \"yes\"",
        ]
    );
}

#[test]
fn text_attributes_must_be_strings() {
    let diagnostics = form_with_field("          type: string\n          helpText: 12\n");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Value is not a string \"12\"");
}

#[test]
fn malformed_forms() {
    let diagnostics = validate_ui(&yaml("Forms:\n  - name1:\n      title: x\n"));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Malformed form: form \"name1\" has no fields");

    let diagnostics = validate_ui(&yaml("Forms: {name1: {}}\n"));
    assert_eq!(diagnostics[0].code, "E082");

    let diagnostics = validate_ui(&yaml("Forms:\n  - a: {fields: []}\n    b: {fields: []}\n"));
    assert_eq!(diagnostics[0].message, "Malformed form: each form should be a single-key mapping");
}

#[test]
fn unknown_top_level_key() {
    let diagnostics = validate_ui(&yaml("Forms: []\nWorkflow: {}\n"));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "W010");
}
