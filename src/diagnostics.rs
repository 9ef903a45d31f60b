//! Diagnostic model for package findings.
//!
//! # Overview
//!
//! Every finding produced by a validator is a [`Diagnostic`]: a stable code,
//! a human-readable message and, when the offending node carries one, the
//! file/line/column it came from. The closed set of findings is the
//! [`DiagnosticKind`] enum; each variant knows its own code and formats its
//! own message, so there is no process-wide table of report constructors.
//!
//! # Construction
//!
//! - Use [`Diagnostic::at`] when the finding is about a node.
//! - Use [`Diagnostic::in_file`] for file-level findings (unparseable YAML,
//!   missing manifest) that have no node to point at.
//! - Positions are copied from the node only when present. They are never
//!   guessed.

use std::fmt;

use serde::Serialize;

use crate::ast::{Position, SourceNode};

// =============================================================================
// SEVERITY
// =============================================================================

/// Severity of a diagnostic, derived from the first letter of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn from_code(code: &str) -> Self {
        if code.starts_with('W') {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// DIAGNOSTIC KINDS
// =============================================================================

/// All findings the checker can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    // Package and file level
    YamlSyntax { detail: String },
    UnreadableFile { path: String, detail: String },
    MissingManifest,
    DocumentNotMapping,

    // Top-level keys
    MissingRequiredKey { key: String },
    UnknownKey { key: String },
    NotAString { value: String },

    // Manifest
    RequireNotMapping,
    UnsupportedFormat { format: String },
    ClassFileMissing { file: String },
    ClassFileNotListed { file: String },
    TagsNotList,
    InvalidPackageType { value: String },
    UiNotFilename,
    UiFileMissing { file: String },
    LogoFileMissing { file: String },
    LogoNotFilename,

    // Class
    InvalidClassName { name: String },
    ClassNameCase { name: String },
    InvalidExtends { value: String },
    InvalidExtendsType,
    InvalidPropertyName { name: String },
    InvalidUsage { usage: String },
    InvalidNamespaces,
    InvalidBody,
    MissingContract { property: String },
    EmptyContractList { name: String },
    InvalidScope { scope: String },
    NamespaceMismatch { class: String, qualified: String },

    // UI forms
    InvalidFieldType { value: String },
    NotABoolean { key: String, value: String },
    MalformedForm { detail: String },

    // Code structure
    MalformedStructure,
    InvalidVariableName { name: String },
    InvalidExpression { text: String },
    NotAStringValue { value: String },
    UnexpectedValue { value: String },
    MissingKeyword { keyword: String, construct: String },
    UnknownKeywordInConstruct { keyword: String, construct: String },
    CasesNotMapping { construct: String },

    // A checker failed internally
    CheckerFailure { key: String, detail: String },
}

impl DiagnosticKind {
    /// Stable identifier of this kind of finding.
    pub fn code(&self) -> &'static str {
        use DiagnosticKind::*;
        match self {
            YamlSyntax { .. } => "E001",
            UnreadableFile { .. } => "E002",
            MissingManifest => "E003",
            DocumentNotMapping => "E004",
            RequireNotMapping => "E005",
            InvalidClassName { .. } => "E011",
            ClassNameCase { .. } => "W011",
            MissingRequiredKey { .. } => "E020",
            UnknownKey { .. } => "W010",
            InvalidExtends { .. } => "E023",
            InvalidExtendsType => "E024",
            UnsupportedFormat { .. } => "E030",
            NotAString { .. } => "E040",
            InvalidPropertyName { .. } => "E041",
            InvalidUsage { .. } => "E042",
            InvalidNamespaces => "E044",
            InvalidBody => "E045",
            UnknownKeywordInConstruct { .. } => "E046",
            MissingContract { .. } => "E047",
            EmptyContractList { .. } => "E048",
            InvalidScope { .. } => "E049",
            ClassFileMissing { .. } => "E050",
            ClassFileNotListed { .. } => "W020",
            NamespaceMismatch { .. } => "E060",
            TagsNotList => "E070",
            InvalidPackageType { .. } => "E071",
            UiNotFilename => "E072",
            UiFileMissing { .. } => "E073",
            LogoFileMissing { .. } => "E074",
            LogoNotFilename => "E075",
            InvalidFieldType { .. } => "E080",
            NotABoolean { .. } => "E081",
            MalformedForm { .. } => "E082",
            MalformedStructure => "E200",
            InvalidVariableName { .. } => "E201",
            InvalidExpression { .. } => "E202",
            NotAStringValue { .. } => "E203",
            UnexpectedValue { .. } => "E204",
            MissingKeyword { .. } => "E205",
            CasesNotMapping { .. } => "E206",
            CheckerFailure { .. } => "E999",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_code(self.code())
    }

    /// Human-readable message for this finding.
    pub fn message(&self) -> String {
        use DiagnosticKind::*;
        match self {
            YamlSyntax { detail } => format!("Unable to parse YAML: {}", detail),
            UnreadableFile { path, detail } => format!("Unable to read \"{}\": {}", path, detail),
            MissingManifest => "Missing manifest.yaml".to_string(),
            DocumentNotMapping => "Document should be a mapping".to_string(),
            RequireNotMapping => "Require is not a dict type".to_string(),
            InvalidClassName { name } => format!("Invalid class name \"{}\"", name),
            ClassNameCase { name } => format!("Class name \"{}\" should be CamelCase", name),
            MissingRequiredKey { key } => format!("Missing required key \"{}\"", key),
            UnknownKey { key } => format!("Unknown key \"{}\"", key),
            InvalidExtends { value } => format!("Wrong extended class \"{}\"", value),
            InvalidExtendsType => "Wrong extended class type".to_string(),
            UnsupportedFormat { format } => format!("Not supported format version \"{}\"", format),
            NotAString { value } => format!("Value is not a string \"{}\"", value),
            InvalidPropertyName { name } => format!("Wrong property name \"{}\"", name),
            InvalidUsage { usage } => format!("Not allowed usage \"{}\"", usage),
            InvalidNamespaces => "Wrong type of namespace".to_string(),
            InvalidBody => "Body is not a list or scalar/yaql expression".to_string(),
            UnknownKeywordInConstruct { keyword, construct } => {
                format!("Unknown keyword \"{}\" in \"{}\"", keyword, construct)
            }
            MissingContract { property } => format!("Missing Contract in property \"{}\"", property),
            EmptyContractList { name } => format!("Contract of \"{}\" is an empty list", name),
            InvalidScope { scope } => format!("Wrong Scope \"{}\"", scope),
            ClassFileMissing { file } => {
                format!("File is present in Manifest {}, but not in filesystem", file)
            }
            ClassFileNotListed { file } => {
                format!("File is not present in Manifest, but it is in filesystem: {}", file)
            }
            NamespaceMismatch { class, qualified } => format!(
                "Namespace of class \"{}\" in \"{}\" doesn't match namespace provided in Manifest",
                class, qualified
            ),
            TagsNotList => "Tags should be a list".to_string(),
            InvalidPackageType { value } => format!("Type is invalid \"{}\"", value),
            UiNotFilename => "UI is not a filename".to_string(),
            UiFileMissing { file } => format!("There is no UI file mention in manifest \"{}\"", file),
            LogoFileMissing { file } => {
                format!("There is no Logo file mention in manifest \"{}\"", file)
            }
            LogoNotFilename => "Logo is not a filename".to_string(),
            InvalidFieldType { value } => format!("Wrong type of field \"{}\"", value),
            NotABoolean { key, value } => {
                format!("Value of {} should be boolean not \"{}\"", key, value)
            }
            MalformedForm { detail } => format!("Malformed form: {}", detail),
            MalformedStructure => "Wrong code structure/assignment probably typo".to_string(),
            InvalidVariableName { name } => format!("Not valid variable name \"{}\"", name),
            InvalidExpression { text } => format!("Not a valid yaql expression \"{}\"", text),
            NotAStringValue { value } => format!("Value should be string type \"{}\"", value),
            UnexpectedValue { value } => format!("There should be no value here \"{}\"", value),
            MissingKeyword { keyword, construct } => format!(
                "Missing keyword \"{}\" for \"{}\" code structure",
                keyword, construct
            ),
            CasesNotMapping { construct } => {
                format!("Cases of \"{}\" should be a mapping", construct)
            }
            CheckerFailure { key, detail } => format!("Check of \"{}\" failed: {}", key, detail),
        }
    }
}

// =============================================================================
// DIAGNOSTIC
// =============================================================================

/// A single reported finding with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "details")]
    pub kind: DiagnosticKind,
    pub code: &'static str,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Diagnostic {
    /// A diagnostic about `node`, positioned where the node starts.
    pub fn at(kind: DiagnosticKind, node: &SourceNode) -> Self {
        Self::at_position(kind, node.position.as_ref())
    }

    pub fn at_position(kind: DiagnosticKind, position: Option<&Position>) -> Self {
        let mut diagnostic = Self::detached(kind);
        if let Some(position) = position {
            diagnostic.file = position.file.as_deref().map(str::to_string);
            diagnostic.line = Some(position.line);
            diagnostic.column = Some(position.column);
        }
        diagnostic
    }

    /// A file-level diagnostic with no line or column.
    pub fn in_file(kind: DiagnosticKind, file: impl Into<String>) -> Self {
        let mut diagnostic = Self::detached(kind);
        diagnostic.file = Some(file.into());
        diagnostic
    }

    pub fn detached(kind: DiagnosticKind) -> Self {
        Self {
            code: kind.code(),
            message: kind.message(),
            kind,
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_code(self.code)
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// Fills in the file name when the node had no file attached.
    pub fn or_file(mut self, file: &str) -> Self {
        if self.file.is_none() {
            self.file = Some(file.to_string());
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Builds a diagnostic for `kind` at `source` (if any).
pub fn make_diagnostic(kind: DiagnosticKind, source: Option<&SourceNode>) -> Diagnostic {
    match source {
        Some(node) => Diagnostic::at(kind, node),
        None => Diagnostic::detached(kind),
    }
}
