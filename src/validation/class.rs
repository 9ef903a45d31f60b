//! Checks for class files under `Classes/`.
//!
//! Besides the key-level checks this runs the structural validator on every
//! method `Body`, the expression checker on every contract leaf and, when a
//! manifest was parsed, the namespace cross-check.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{SourceNode, Value};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expression::ExpressionChecker;
use crate::validation::namespace::{check_namespace, ClassDescriptor, ManifestDescriptor};
use crate::validation::schema::{accept, check_string, CheckError, CheckResult, DocumentSchema};
use crate::validation::structure::CodeStructureChecker;

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// `alias:Name`, `Name` or a dotted fully-qualified name.
static CLASS_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*:)?[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

const PROPERTY_USAGES: &[&str] = &["In", "Out", "InOut", "Const", "Static", "Runtime", "Config"];

const METHOD_USAGES: &[&str] = &["Runtime", "Action", "Static", "Extension"];

const METHOD_SCOPES: &[&str] = &["Public", "Session"];

const CLASS_USAGES: &[&str] = &["Class", "Meta"];

/// Builds the class schema.
///
/// The namespace cross-check is registered only when `manifest` is given.
pub fn class_schema<'a>(
    expressions: &'a dyn ExpressionChecker,
    manifest: Option<&'a ManifestDescriptor>,
) -> DocumentSchema<'a> {
    let mut schema = DocumentSchema::new();
    schema
        .add_checker("Name", check_string, false)
        .add_checker("Name", check_class_name, false)
        .add_checker("Namespaces", check_namespaces, true)
        .add_checker("Extends", check_extends, false)
        .add_checker("Properties", move |value| check_properties(expressions, value), false)
        .add_checker("Methods", move |value| check_methods(expressions, value), false)
        .add_checker("Usage", check_class_usage, false)
        .add_checker("Meta", accept, false)
        .add_checker("Import", accept, false);

    if let Some(manifest) = manifest {
        schema.add_document_checker(move |document| {
            let class = ClassDescriptor::from_node(document);
            Ok(check_namespace(&class, manifest).into_iter().collect())
        });
    }
    schema
}

pub fn validate_class(
    document: &SourceNode,
    expressions: &dyn ExpressionChecker,
    manifest: Option<&ManifestDescriptor>,
) -> Vec<Diagnostic> {
    class_schema(expressions, manifest).validate(document)
}

// =====================
// Class-level keys
// =====================

fn check_class_name(value: &SourceNode) -> CheckResult {
    // non-strings are already reported by `check_string`
    let Some(name) = value.as_str() else {
        return Ok(vec![]);
    };

    let mut diagnostics = Vec::new();
    if name.starts_with("__") || !IDENTIFIER_RE.is_match(name) {
        diagnostics.push(Diagnostic::at(
            DiagnosticKind::InvalidClassName {
                name: name.to_string(),
            },
            value,
        ));
    }
    if name == name.to_lowercase() || name == name.to_uppercase() {
        diagnostics.push(Diagnostic::at(
            DiagnosticKind::ClassNameCase {
                name: name.to_string(),
            },
            value,
        ));
    }
    Ok(diagnostics)
}

fn check_namespaces(value: &SourceNode) -> CheckResult {
    if value.is_mapping() {
        return Ok(vec![]);
    }
    Ok(vec![Diagnostic::at(DiagnosticKind::InvalidNamespaces, value)])
}

fn check_extends(value: &SourceNode) -> CheckResult {
    let invalid = |node: &SourceNode| {
        let valid = node.as_str().is_some_and(|class| CLASS_REF_RE.is_match(class));
        (!valid).then(|| {
            Diagnostic::at(
                DiagnosticKind::InvalidExtends {
                    value: node.to_string(),
                },
                node,
            )
        })
    };

    match &value.value {
        Value::Sequence(items) => Ok(items.iter().filter_map(invalid).collect()),
        Value::Scalar(_) if value.as_str().is_some() => Ok(invalid(value).into_iter().collect()),
        _ => Ok(vec![Diagnostic::at(DiagnosticKind::InvalidExtendsType, value)]),
    }
}

fn check_class_usage(value: &SourceNode) -> CheckResult {
    Ok(check_usage(value, CLASS_USAGES).into_iter().collect())
}

fn check_usage(value: &SourceNode, allowed: &[&str]) -> Option<Diagnostic> {
    let usage = value.key_text().unwrap_or_else(|| value.to_string());
    if allowed.contains(&usage.as_str()) {
        return None;
    }
    Some(Diagnostic::at(DiagnosticKind::InvalidUsage { usage }, value))
}

// =====================
// Properties and contracts
// =====================

fn check_properties(expressions: &dyn ExpressionChecker, value: &SourceNode) -> CheckResult {
    if value.is_null() {
        return Ok(vec![]);
    }
    let properties = value
        .as_mapping()
        .ok_or_else(|| CheckError::Failed(format!("Properties should be a mapping, found {}", value)))?;

    let mut diagnostics = Vec::new();
    for (name, definition) in properties {
        let valid_name = name.as_str().is_some_and(|text| IDENTIFIER_RE.is_match(text));
        if !valid_name {
            diagnostics.push(Diagnostic::at(
                DiagnosticKind::InvalidPropertyName {
                    name: name.to_string(),
                },
                name,
            ));
        }

        if let Some(usage) = definition.get("Usage") {
            diagnostics.extend(check_usage(usage, PROPERTY_USAGES));
        }

        match definition.get("Contract") {
            Some(contract) => check_contract(expressions, &name.to_string(), contract, &mut diagnostics),
            None => diagnostics.push(Diagnostic::at(
                DiagnosticKind::MissingContract {
                    property: name.to_string(),
                },
                name,
            )),
        }
    }
    Ok(diagnostics)
}

/// Walks a contract and checks every string leaf as an expression.
fn check_contract(
    expressions: &dyn ExpressionChecker,
    owner: &str,
    contract: &SourceNode,
    out: &mut Vec<Diagnostic>,
) {
    match &contract.value {
        Value::Scalar(_) => {
            let Some(text) = contract.as_str() else {
                return;
            };
            if expressions.check(text).is_err() {
                out.push(Diagnostic::at(
                    DiagnosticKind::InvalidExpression {
                        text: text.to_string(),
                    },
                    contract,
                ));
            }
        }
        Value::Sequence(items) if items.is_empty() => out.push(Diagnostic::at(
            DiagnosticKind::EmptyContractList {
                name: owner.to_string(),
            },
            contract,
        )),
        Value::Sequence(items) => {
            for item in items {
                check_contract(expressions, owner, item, out);
            }
        }
        Value::Mapping(entries) => {
            for (_, item) in entries {
                check_contract(expressions, owner, item, out);
            }
        }
    }
}

// =====================
// Methods
// =====================

fn check_methods(expressions: &dyn ExpressionChecker, value: &SourceNode) -> CheckResult {
    if value.is_null() {
        return Ok(vec![]);
    }
    let methods = value
        .as_mapping()
        .ok_or_else(|| CheckError::Failed(format!("Methods should be a mapping, found {}", value)))?;

    let structure = CodeStructureChecker::new(expressions);
    let mut diagnostics = Vec::new();
    for (name, method) in methods {
        tracing::trace!(method = %name, "checking method");

        if let Some(scope) = method.get("Scope") {
            let scope_text = scope.key_text().unwrap_or_else(|| scope.to_string());
            if !METHOD_SCOPES.contains(&scope_text.as_str()) {
                diagnostics.push(Diagnostic::at(DiagnosticKind::InvalidScope { scope: scope_text }, scope));
            }
        }

        if let Some(usage) = method.get("Usage") {
            diagnostics.extend(check_usage(usage, METHOD_USAGES));
        }

        if let Some(arguments) = method.get("Arguments") {
            check_arguments(expressions, arguments, &mut diagnostics);
        }

        if let Some(body) = method.get("Body") {
            match &body.value {
                Value::Sequence(_) => diagnostics.extend(structure.validate_block(body)),
                Value::Scalar(_) if !body.is_null() => diagnostics.extend(structure.validate_block(body)),
                _ => diagnostics.push(Diagnostic::at(DiagnosticKind::InvalidBody, body)),
            }
        }
    }
    Ok(diagnostics)
}

/// Arguments are a mapping or a list of single-key mappings.
fn check_arguments(expressions: &dyn ExpressionChecker, arguments: &SourceNode, out: &mut Vec<Diagnostic>) {
    let entries: Vec<&(SourceNode, SourceNode)> = match &arguments.value {
        Value::Mapping(entries) => entries.iter().collect(),
        Value::Sequence(items) => items
            .iter()
            .filter_map(SourceNode::as_mapping)
            .flat_map(|entries| entries.iter())
            .collect(),
        _ => return,
    };

    for (name, definition) in entries {
        if let Some(contract) = definition.get("Contract") {
            check_contract(expressions, &name.to_string(), contract, out);
        }
    }
}
