use miette::Diagnostic;
use thiserror::Error;

/// A YAML document that could not be turned into a source tree.
///
/// Line and column are 1-based and present whenever the scanner reported a
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(mplcheck::yaml), help("check indentation and quoting near the reported position"))]
pub struct YamlError {
    pub message: String,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl YamlError {
    pub fn new(message: impl Into<String>, file: Option<&str>) -> Self {
        Self {
            message: message.into(),
            file: file.map(str::to_string),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}
