//! YAML front end.
//!
//! Turns package files into [`SourceNode`](crate::ast::SourceNode) trees with
//! line/column positions attached to every node.

pub mod error;
pub mod parser;

pub use error::YamlError;
pub use parser::{parse_document, parse_documents};
