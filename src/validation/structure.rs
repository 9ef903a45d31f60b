//! Structural validation of method bodies.
//!
//! A body is a tree of statements: expression strings, variable
//! assignments (`$name: expression`) and control constructs (`If`, `While`,
//! `Try`, ...). [`CodeStructureChecker`] walks the tree depth-first, checks
//! each construct against the keyword grammar in
//! [`grammar`](crate::validation::grammar) and hands leaf strings to the
//! expression checker.
//!
//! ## Invariants
//! - Never mutates input; the same tree always yields the same diagnostics.
//! - Never fails: every anomaly becomes a diagnostic and traversal continues.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Scalar, SourceNode, Value};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expression::ExpressionChecker;
use crate::validation::grammar::{self, CheckKind, GrammarRule};

static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Validates a body against the construct grammar.
///
/// # Examples
///
/// ```rust
/// use mplcheck::ast::SourceNode;
/// use mplcheck::expression::YaqlChecker;
/// use mplcheck::validation::structure::CodeStructureChecker;
///
/// let expressions = YaqlChecker::default();
/// let checker = CodeStructureChecker::new(&expressions);
/// let body = SourceNode::mapping(vec![("While".into(), "$.deploy()".into())]);
/// let diagnostics = checker.validate_block(&body);
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(
///     diagnostics[0].message,
///     "Missing keyword \"Do\" for \"While\" code structure"
/// );
/// ```
pub struct CodeStructureChecker<'a> {
    expressions: &'a dyn ExpressionChecker,
}

impl<'a> CodeStructureChecker<'a> {
    pub fn new(expressions: &'a dyn ExpressionChecker) -> Self {
        Self { expressions }
    }

    /// Validates one body and returns every finding, fully flattened.
    pub fn validate_block(&self, node: &SourceNode) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.block(node, &mut diagnostics);
        diagnostics
    }

    /// Runs one check kind on a value found under `construct`.
    fn run_check(&self, construct: &str, check: CheckKind, value: &SourceNode, out: &mut Vec<Diagnostic>) {
        match check {
            CheckKind::CodeBlock => self.block(value, out),
            CheckKind::Expression | CheckKind::Predicate | CheckKind::Number => {
                self.expression(value, out)
            }
            CheckKind::String => self.string(value, out),
            CheckKind::Empty => self.empty(value, out),
            CheckKind::PairedMap(left, right) => self.paired_map(construct, left, right, value, out),
        }
    }

    // =====================
    // Node classification
    // =====================

    fn block(&self, node: &SourceNode, out: &mut Vec<Diagnostic>) {
        match &node.value {
            Value::Scalar(Scalar::Str(_)) => self.expression(node, out),
            Value::Scalar(_) => {}
            Value::Sequence(items) => {
                for item in items {
                    self.block(item, out);
                }
            }
            Value::Mapping(entries) => self.mapping(node, entries, out),
        }
    }

    fn mapping(&self, node: &SourceNode, entries: &[(SourceNode, SourceNode)], out: &mut Vec<Diagnostic>) {
        let keys: Vec<&str> = entries.iter().filter_map(|(k, _)| k.as_str()).collect();

        let Some(rule) = grammar::resolve_construct(&keys) else {
            match entries {
                [(key, value)] => self.assignment(key, value, out),
                _ => out.push(Diagnostic::at(DiagnosticKind::MalformedStructure, node)),
            }
            return;
        };

        tracing::trace!(construct = rule.keyword, "checking construct");
        self.construct(rule, entries, &keys, node, out);
    }

    fn assignment(&self, key: &SourceNode, value: &SourceNode, out: &mut Vec<Diagnostic>) {
        let valid_name = key.as_str().is_some_and(|name| VARIABLE_RE.is_match(name));
        if !valid_name {
            out.push(Diagnostic::at(
                DiagnosticKind::InvalidVariableName {
                    name: key.to_string(),
                },
                key,
            ));
        }
        self.expression(value, out);
    }

    fn construct(
        &self,
        rule: &'static GrammarRule,
        entries: &[(SourceNode, SourceNode)],
        keys: &[&str],
        node: &SourceNode,
        out: &mut Vec<Diagnostic>,
    ) {
        let construct_key = entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(rule.keyword))
            .map(|(k, _)| k)
            .unwrap_or(node);

        for missing in rule.required_children().filter(|child| !keys.contains(&child.keyword)) {
            out.push(Diagnostic::at(
                DiagnosticKind::MissingKeyword {
                    keyword: missing.keyword.to_string(),
                    construct: rule.keyword.to_string(),
                },
                construct_key,
            ));
        }

        for (key, _) in entries {
            let known = key.as_str().is_some_and(|k| rule.allows(k));
            if !known {
                out.push(Diagnostic::at(
                    DiagnosticKind::UnknownKeywordInConstruct {
                        keyword: key.to_string(),
                        construct: rule.keyword.to_string(),
                    },
                    key,
                ));
            }
        }

        for (key, value) in entries {
            let Some(check) = key.as_str().and_then(|k| rule.check_for(k)) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            self.run_check(rule.keyword, check, value, out);
        }
    }

    // =====================
    // Leaf checks
    // =====================

    fn expression(&self, value: &SourceNode, out: &mut Vec<Diagnostic>) {
        // numbers, booleans and data literals are values, not expressions
        let Some(text) = value.as_str() else {
            return;
        };

        if let Err(error) = self.expressions.check(text) {
            tracing::trace!(%error, text, "invalid expression");
            out.push(Diagnostic::at(
                DiagnosticKind::InvalidExpression {
                    text: text.to_string(),
                },
                value,
            ));
        }
    }

    fn string(&self, value: &SourceNode, out: &mut Vec<Diagnostic>) {
        if value.as_str().is_none() {
            out.push(Diagnostic::at(
                DiagnosticKind::NotAStringValue {
                    value: value.to_string(),
                },
                value,
            ));
        }
    }

    fn empty(&self, value: &SourceNode, out: &mut Vec<Diagnostic>) {
        if !value.is_empty() {
            out.push(Diagnostic::at(
                DiagnosticKind::UnexpectedValue {
                    value: value.to_string(),
                },
                value,
            ));
        }
    }

    fn paired_map(
        &self,
        construct: &str,
        left: &CheckKind,
        right: &CheckKind,
        value: &SourceNode,
        out: &mut Vec<Diagnostic>,
    ) {
        let Some(cases) = value.as_mapping() else {
            out.push(Diagnostic::at(
                DiagnosticKind::CasesNotMapping {
                    construct: construct.to_string(),
                },
                value,
            ));
            return;
        };

        for (case, body) in cases {
            self.run_check(construct, *left, case, out);
            self.run_check(construct, *right, body, out);
        }
    }
}

/// Validates a body with the given expression checker.
pub fn validate_block(node: &SourceNode, expressions: &dyn ExpressionChecker) -> Vec<Diagnostic> {
    CodeStructureChecker::new(expressions).validate_block(node)
}
