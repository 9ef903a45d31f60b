//! Expression checker.
//!
//! Leaf strings in class bodies, contracts and predicates are written in the
//! embedded expression language. This module only answers whether a string
//! parses; evaluation is out of reach by construction.

use std::num::NonZeroUsize;

use once_cell::sync::OnceCell;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::config::ExpressionLimits;

#[derive(Parser)]
#[grammar = "expression/yaql.pest"]
struct YaqlParser;

// ============================================================================
// ERRORS
// ============================================================================

/// Why an expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("empty expression")]
    Empty,
    #[error("expression is {length} bytes long, limit is {limit}")]
    TooLong { length: usize, limit: usize },
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
}

// ============================================================================
// CHECKER CAPABILITY
// ============================================================================

/// Capability: "does this string parse as a valid expression".
///
/// Implementations must be shareable across validation workers and must
/// never panic on arbitrary input.
pub trait ExpressionChecker: Send + Sync {
    fn check(&self, text: &str) -> Result<(), ExpressionError>;

    fn is_valid(&self, text: &str) -> bool {
        self.check(text).is_ok()
    }
}

/// Parser call budget shared by every checker in the process.
static CALL_LIMIT: OnceCell<Option<NonZeroUsize>> = OnceCell::new();

/// Installs pest's call limit. pest keeps a single limit per process, so
/// only the first request takes effect; later requests for a different
/// limit are logged and ignored.
fn install_call_limit(requested: usize) {
    let requested = NonZeroUsize::new(requested);
    let installed = *CALL_LIMIT.get_or_init(|| {
        pest::set_call_limit(requested);
        requested
    });
    if installed != requested {
        tracing::warn!(
            requested = requested.map_or(0, NonZeroUsize::get),
            installed = installed.map_or(0, NonZeroUsize::get),
            "expression call limit already installed, keeping it"
        );
    }
}

/// The call limit in effect; `None` until a checker has been built and
/// `Some(0)` when unlimited.
pub fn installed_call_limit() -> Option<usize> {
    CALL_LIMIT.get().map(|limit| limit.map_or(0, NonZeroUsize::get))
}

/// Expression checker backed by a pest grammar.
///
/// The parser itself is stateless. Work per expression is bounded by a
/// maximum input length and by pest's call limit, which is process-wide:
/// the first checker built fixes it for every later one.
///
/// # Examples
///
/// ```rust
/// use mplcheck::expression::{ExpressionChecker, YaqlChecker};
/// let checker = YaqlChecker::default();
/// assert!(checker.is_valid("$.deploy()"));
/// assert!(!checker.is_valid("$.deploy("));
/// ```
#[derive(Debug, Clone)]
pub struct YaqlChecker {
    max_length: usize,
}

impl YaqlChecker {
    pub fn new(limits: &ExpressionLimits) -> Self {
        install_call_limit(limits.call_limit);
        Self {
            max_length: limits.max_length,
        }
    }
}

impl Default for YaqlChecker {
    fn default() -> Self {
        Self::new(&ExpressionLimits::default())
    }
}

impl ExpressionChecker for YaqlChecker {
    fn check(&self, text: &str) -> Result<(), ExpressionError> {
        if text.trim().is_empty() {
            return Err(ExpressionError::Empty);
        }

        if text.len() > self.max_length {
            return Err(ExpressionError::TooLong {
                length: text.len(),
                limit: self.max_length,
            });
        }

        YaqlParser::parse(Rule::expression, text)
            .map(|_| ())
            .map_err(|e| {
                let (line, column) = match e.line_col {
                    pest::error::LineColLocation::Pos(pos) => pos,
                    pest::error::LineColLocation::Span(start, _) => start,
                };
                ExpressionError::Syntax {
                    message: e.variant.message().into_owned(),
                    line,
                    column,
                }
            })
    }
}
