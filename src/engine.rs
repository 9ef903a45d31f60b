//! Package checking pipeline.
//!
//! The engine opens a package, parses its manifest once, then runs every
//! registered [`PackageValidator`] against a shared read-only
//! [`CheckContext`]. Class files are independent of each other and are
//! checked in parallel; results are kept in sorted file order so the output
//! is identical from run to run.

use std::path::Path;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::ast::{Position, SourceNode};
use crate::config::CheckConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expression::{ExpressionChecker, YaqlChecker};
use crate::package::{Package, PackageError, PackageFile};
use crate::validation::{
    class::validate_class,
    manifest::{validate_manifest, CLASSES_DIR, MANIFEST_FILE},
    namespace::ManifestDescriptor,
    ui::{validate_ui, UI_FILE_PATTERN},
};

static CLASS_FILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Classes/.+\.yaml$").unwrap());

// ============================================================================
// CHECK CONTEXT
// ============================================================================

/// Everything a validator may read. Shared by all workers, never mutated.
pub struct CheckContext<'a> {
    pub package: &'a Package,
    pub expressions: &'a dyn ExpressionChecker,
    /// Class registry of the manifest, when it could be parsed.
    pub manifest: Option<ManifestDescriptor>,
}

impl<'a> CheckContext<'a> {
    pub fn new(package: &'a Package, expressions: &'a dyn ExpressionChecker) -> Self {
        let manifest = package
            .exists(MANIFEST_FILE)
            .then(|| load_document(package, MANIFEST_FILE).ok())
            .flatten()
            .map(|document| ManifestDescriptor::from_node(&document));
        Self {
            package,
            expressions,
            manifest,
        }
    }
}

/// Reads a file and returns its first document, or the diagnostic that
/// explains why it is unusable.
pub fn load_document(package: &Package, path: &str) -> Result<SourceNode, Diagnostic> {
    let file = package.read(path).map_err(|error| {
        Diagnostic::in_file(
            DiagnosticKind::UnreadableFile {
                path: path.to_string(),
                detail: error.to_string(),
            },
            path,
        )
    })?;
    parsed_document(&file)
}

fn parsed_document(file: &PackageFile) -> Result<SourceNode, Diagnostic> {
    file.document().map_err(|error| {
        let kind = DiagnosticKind::YamlSyntax {
            detail: error.message.clone(),
        };
        match (error.line, error.column) {
            (Some(line), Some(column)) => {
                Diagnostic::at_position(kind, Some(&Position::new(line, column, Some(&file.path))))
            }
            _ => Diagnostic::in_file(kind, file.path.as_str()),
        }
    })
}

// ============================================================================
// VALIDATOR CAPABILITY
// ============================================================================

/// One pass over a package.
pub trait PackageValidator: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, context: &CheckContext<'_>) -> Vec<Diagnostic>;
}

/// Ordered set of package validators.
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn PackageValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self { validators: vec![] }
    }

    /// Manifest, UI forms and classes, in that order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ManifestValidator));
        registry.register(Box::new(UiValidator));
        registry.register(Box::new(ClassValidator));
        registry
    }

    pub fn register(&mut self, validator: Box<dyn PackageValidator>) {
        self.validators.push(validator);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn validate_all(&self, context: &CheckContext<'_>) -> Vec<Diagnostic> {
        self.validators
            .iter()
            .flat_map(|validator| {
                let _span = tracing::debug_span!("validator", name = validator.name()).entered();
                let diagnostics = validator.validate(context);
                tracing::debug!(count = diagnostics.len(), "validator finished");
                diagnostics
            })
            .collect()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

// ============================================================================
// BUILT-IN VALIDATORS
// ============================================================================

pub struct ManifestValidator;

impl PackageValidator for ManifestValidator {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn validate(&self, context: &CheckContext<'_>) -> Vec<Diagnostic> {
        if !context.package.exists(MANIFEST_FILE) {
            return vec![Diagnostic::in_file(
                DiagnosticKind::MissingManifest,
                context.package.describe(),
            )];
        }

        match load_document(context.package, MANIFEST_FILE) {
            Ok(document) => validate_manifest(&document, context.package)
                .into_iter()
                .map(|d| d.or_file(MANIFEST_FILE))
                .collect(),
            Err(diagnostic) => vec![diagnostic],
        }
    }
}

pub struct UiValidator;

impl PackageValidator for UiValidator {
    fn name(&self) -> &'static str {
        "ui"
    }

    fn validate(&self, context: &CheckContext<'_>) -> Vec<Diagnostic> {
        let files = match context.package.search_for(UI_FILE_PATTERN, Some("UI")) {
            Ok(files) => files,
            Err(error) => return vec![unreadable("UI", &error)],
        };

        files
            .iter()
            .flat_map(|file| match parsed_document(file) {
                Ok(document) => validate_ui(&document)
                    .into_iter()
                    .map(|d| d.or_file(&file.path))
                    .collect(),
                Err(diagnostic) => vec![diagnostic],
            })
            .collect()
    }
}

pub struct ClassValidator;

impl ClassValidator {
    fn validate_file(&self, context: &CheckContext<'_>, path: &str) -> Vec<Diagnostic> {
        tracing::trace!(path, "checking class file");
        match load_document(context.package, path) {
            Ok(document) => validate_class(&document, context.expressions, context.manifest.as_ref())
                .into_iter()
                .map(|d| d.or_file(path))
                .collect(),
            Err(diagnostic) => vec![diagnostic],
        }
    }
}

impl PackageValidator for ClassValidator {
    fn name(&self) -> &'static str {
        "classes"
    }

    fn validate(&self, context: &CheckContext<'_>) -> Vec<Diagnostic> {
        let files = match context.package.list_files(Some(CLASSES_DIR)) {
            Ok(files) => files,
            Err(error) => return vec![unreadable(CLASSES_DIR, &error)],
        };

        // `collect` keeps the input order
        let per_file: Vec<Vec<Diagnostic>> = files
            .par_iter()
            .filter(|path| is_class_file(path))
            .map(|path| self.validate_file(context, path))
            .collect();
        per_file.into_iter().flatten().collect()
    }
}

fn unreadable(path: &str, error: &PackageError) -> Diagnostic {
    Diagnostic::in_file(
        DiagnosticKind::UnreadableFile {
            path: path.to_string(),
            detail: error.to_string(),
        },
        path,
    )
}

// ============================================================================
// CHECKER
// ============================================================================

/// Runs the registered validators and applies the configured code filter.
///
/// # Examples
///
/// ```rust,no_run
/// use mplcheck::config::CheckConfig;
/// use mplcheck::engine::Checker;
///
/// let checker = Checker::new(CheckConfig::default());
/// let diagnostics = checker.check_path("./io.murano.apps.Example").unwrap();
/// for diagnostic in &diagnostics {
///     println!("{}", diagnostic);
/// }
/// ```
pub struct Checker {
    config: CheckConfig,
    registry: ValidatorRegistry,
    expressions: YaqlChecker,
}

impl Checker {
    pub fn new(config: CheckConfig) -> Self {
        Self::with_registry(config, ValidatorRegistry::with_builtins())
    }

    pub fn with_registry(config: CheckConfig, registry: ValidatorRegistry) -> Self {
        let expressions = YaqlChecker::new(&config.expression);
        Self {
            config,
            registry,
            expressions,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn check_package(&self, package: &Package) -> Vec<Diagnostic> {
        let context = CheckContext::new(package, &self.expressions);
        let diagnostics = self.registry.validate_all(&context);
        let total = diagnostics.len();
        let kept: Vec<Diagnostic> = diagnostics
            .into_iter()
            .filter(|d| self.config.is_enabled(d.code))
            .collect();
        tracing::info!(
            package = %package.describe(),
            total,
            reported = kept.len(),
            "package checked"
        );
        kept
    }

    pub fn check_path(&self, path: impl AsRef<Path>) -> Result<Vec<Diagnostic>, PackageError> {
        let package = Package::open(path)?;
        Ok(self.check_package(&package))
    }
}

/// Whether a path looks like a class file of a package.
pub fn is_class_file(path: &str) -> bool {
    CLASS_FILE_RE.is_match(path)
}
