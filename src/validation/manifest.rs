//! Checks for `manifest.yaml`.

use std::collections::BTreeSet;

use crate::ast::SourceNode;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::package::Package;
use crate::validation::schema::{accept, check_string, CheckError, CheckResult, DocumentSchema};

pub const MANIFEST_FILE: &str = "manifest.yaml";

pub const CLASSES_DIR: &str = "Classes";

const SUPPORTED_FORMATS: &[&str] = &["1.0", "1.1", "1.2", "1.3", "1.4"];

const PACKAGE_TYPES: &[&str] = &["Application", "Library"];

/// Builds the manifest schema for one package.
pub fn manifest_schema(package: &Package) -> DocumentSchema<'_> {
    let mut schema = DocumentSchema::new();
    schema
        .add_checker("Format", check_format, false)
        .add_checker("Type", check_type, true)
        .add_checker("FullName", check_string, true)
        .add_checker("Description", check_string, true)
        .add_checker("Name", check_string, false)
        .add_checker("Author", check_string, false)
        .add_checker("Tags", check_tags, false)
        .add_checker("Require", check_require, false)
        .add_checker("UI", move |value| check_ui(package, value), false)
        .add_checker("Logo", move |value| check_logo(package, value), false)
        .add_checker("Classes", move |value| check_classes(package, value), false)
        .add_checker("Supplier", accept, false);
    schema
}

pub fn validate_manifest(document: &SourceNode, package: &Package) -> Vec<Diagnostic> {
    manifest_schema(package).validate(document)
}

fn single(kind: DiagnosticKind, node: &SourceNode) -> CheckResult {
    Ok(vec![Diagnostic::at(kind, node)])
}

fn check_format(value: &SourceNode) -> CheckResult {
    let format = value.key_text().unwrap_or_else(|| value.to_string());
    let version = format.strip_prefix("MuranoPL/").unwrap_or(&format);
    if SUPPORTED_FORMATS.contains(&version) {
        return Ok(vec![]);
    }
    single(DiagnosticKind::UnsupportedFormat { format }, value)
}

fn check_type(value: &SourceNode) -> CheckResult {
    match value.as_str() {
        Some(kind) if PACKAGE_TYPES.contains(&kind) => Ok(vec![]),
        _ => single(
            DiagnosticKind::InvalidPackageType {
                value: value.to_string(),
            },
            value,
        ),
    }
}

fn check_tags(value: &SourceNode) -> CheckResult {
    if value.is_sequence() {
        return Ok(vec![]);
    }
    single(DiagnosticKind::TagsNotList, value)
}

fn check_require(value: &SourceNode) -> CheckResult {
    if value.is_mapping() {
        return Ok(vec![]);
    }
    single(DiagnosticKind::RequireNotMapping, value)
}

fn check_ui(package: &Package, value: &SourceNode) -> CheckResult {
    let Some(file) = value.as_str() else {
        return single(DiagnosticKind::UiNotFilename, value);
    };
    if package.exists(&format!("UI/{}", file)) {
        return Ok(vec![]);
    }
    single(
        DiagnosticKind::UiFileMissing {
            file: file.to_string(),
        },
        value,
    )
}

fn check_logo(package: &Package, value: &SourceNode) -> CheckResult {
    let Some(file) = value.as_str() else {
        return single(DiagnosticKind::LogoNotFilename, value);
    };
    if package.exists(file) {
        return Ok(vec![]);
    }
    single(
        DiagnosticKind::LogoFileMissing {
            file: file.to_string(),
        },
        value,
    )
}

/// Reconciles the `Classes` registry with the files under `Classes/`.
fn check_classes(package: &Package, value: &SourceNode) -> CheckResult {
    let entries = value
        .as_mapping()
        .ok_or_else(|| CheckError::Failed(format!("Classes should be a mapping, found {}", value)))?;

    let prefix = format!("{}/", CLASSES_DIR);
    let on_disk: BTreeSet<String> = package
        .list_files(Some(CLASSES_DIR))?
        .into_iter()
        .filter_map(|path| path.strip_prefix(&prefix).map(str::to_string))
        .collect();

    let mut diagnostics = Vec::new();
    let mut declared = BTreeSet::new();
    for (_, file) in entries {
        let Some(name) = file.key_text() else {
            continue;
        };
        if !on_disk.contains(&name) && !declared.contains(&name) {
            diagnostics.push(Diagnostic::at(
                DiagnosticKind::ClassFileMissing { file: name.clone() },
                file,
            ));
        }
        declared.insert(name);
    }

    for file in on_disk.difference(&declared) {
        diagnostics.push(Diagnostic::at(
            DiagnosticKind::ClassFileNotListed { file: file.clone() },
            value,
        ));
    }

    Ok(diagnostics)
}
