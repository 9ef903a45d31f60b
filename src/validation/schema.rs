//! Keyword-driven validation of a whole YAML document.
//!
//! A [`DocumentSchema`] is a table of checkers keyed by top-level keyword,
//! built once per file kind. Validating a document runs the document-wide
//! checkers, then the checkers of every present key in document order,
//! then reports missing required keys.
//!
//! Checkers are isolated from each other: an `Err` or a panic inside one is
//! reported as an `E999` diagnostic at the offending value and the rest of
//! the document is still validated.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::ast::SourceNode;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::package::PackageError;

/// Internal failure of a single checker.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("{0}")]
    Failed(String),
}

pub type CheckResult = Result<Vec<Diagnostic>, CheckError>;

/// Checker for the value under one keyword.
pub type KeyChecker<'a> = Box<dyn Fn(&SourceNode) -> CheckResult + Send + Sync + 'a>;

struct KeyRule<'a> {
    keyword: &'static str,
    required: bool,
    checkers: Vec<KeyChecker<'a>>,
}

/// Table of per-keyword checkers for one kind of document.
///
/// # Examples
///
/// ```rust
/// use mplcheck::ast::SourceNode;
/// use mplcheck::validation::schema::DocumentSchema;
///
/// let mut schema = DocumentSchema::new();
/// schema.add_checker("Name", |_| Ok(vec![]), true);
///
/// let document = SourceNode::mapping(vec![("Extra".into(), "x".into())]);
/// let codes: Vec<_> = schema.validate(&document).iter().map(|d| d.code).collect();
/// assert_eq!(codes, ["W010", "E020"]);
/// ```
#[derive(Default)]
pub struct DocumentSchema<'a> {
    rules: Vec<KeyRule<'a>>,
    document_checkers: Vec<KeyChecker<'a>>,
}

impl<'a> DocumentSchema<'a> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            document_checkers: Vec::new(),
        }
    }

    /// Registers a checker for `keyword`.
    ///
    /// Several checkers may share a keyword; they run in registration order.
    /// The keyword is required if any registration says so.
    pub fn add_checker<F>(&mut self, keyword: &'static str, checker: F, required: bool) -> &mut Self
    where
        F: Fn(&SourceNode) -> CheckResult + Send + Sync + 'a,
    {
        match self.rules.iter_mut().find(|rule| rule.keyword == keyword) {
            Some(rule) => {
                rule.required |= required;
                rule.checkers.push(Box::new(checker));
            }
            None => self.rules.push(KeyRule {
                keyword,
                required,
                checkers: vec![Box::new(checker)],
            }),
        }
        self
    }

    /// Registers a checker that sees the whole document.
    pub fn add_document_checker<F>(&mut self, checker: F) -> &mut Self
    where
        F: Fn(&SourceNode) -> CheckResult + Send + Sync + 'a,
    {
        self.document_checkers.push(Box::new(checker));
        self
    }

    pub fn knows(&self, keyword: &str) -> bool {
        self.rules.iter().any(|rule| rule.keyword == keyword)
    }

    pub fn validate(&self, document: &SourceNode) -> Vec<Diagnostic> {
        let Some(entries) = document.as_mapping() else {
            return vec![Diagnostic::at(DiagnosticKind::DocumentNotMapping, document)];
        };

        let mut diagnostics = Vec::new();

        for checker in &self.document_checkers {
            diagnostics.extend(run_checker("document", checker, document));
        }

        for (key, value) in entries {
            let rule = key
                .as_str()
                .and_then(|name| self.rules.iter().find(|rule| rule.keyword == name));
            match rule {
                Some(rule) => {
                    for checker in &rule.checkers {
                        diagnostics.extend(run_checker(rule.keyword, checker, value));
                    }
                }
                None => diagnostics.push(Diagnostic::at(
                    DiagnosticKind::UnknownKey {
                        key: key.to_string(),
                    },
                    key,
                )),
            }
        }

        for rule in self.rules.iter().filter(|rule| rule.required) {
            if document.get(rule.keyword).is_none() {
                diagnostics.push(Diagnostic::at(
                    DiagnosticKind::MissingRequiredKey {
                        key: rule.keyword.to_string(),
                    },
                    document,
                ));
            }
        }

        diagnostics
    }
}

fn run_checker(key: &str, checker: &KeyChecker<'_>, value: &SourceNode) -> Vec<Diagnostic> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| checker(value)));
    let detail = match outcome {
        Ok(Ok(diagnostics)) => return diagnostics,
        Ok(Err(error)) => error.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    tracing::warn!(key, %detail, "checker failed");
    vec![Diagnostic::at(
        DiagnosticKind::CheckerFailure {
            key: key.to_string(),
            detail,
        },
        value,
    )]
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "checker panicked".to_string()
    }
}

// =====================
// Shared leaf checks
// =====================

/// `E040` unless the value is a string.
pub fn check_string(value: &SourceNode) -> CheckResult {
    if value.as_str().is_some() {
        return Ok(vec![]);
    }
    Ok(vec![Diagnostic::at(
        DiagnosticKind::NotAString {
            value: value.to_string(),
        },
        value,
    )])
}

/// Accepts any value.
pub fn accept(_: &SourceNode) -> CheckResult {
    Ok(vec![])
}
