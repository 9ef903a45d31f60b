pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use crate::engine::Checker;

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod expression;
pub mod package;
pub mod syntax;
pub mod validation;
