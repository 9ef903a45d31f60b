//! Cross-check of a class's qualified name against the manifest registry.

use std::collections::BTreeMap;

use crate::ast::{Position, SourceNode};
use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Alias of the class's own namespace.
pub const DEFAULT_NAMESPACE: &str = "=";

/// What the namespace check needs to know about one class file. Other class
/// keys are checked on the source tree by the class schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDescriptor {
    pub name: Option<String>,
    /// Where `Name`'s value sits; diagnostics point here.
    pub name_position: Option<Position>,
    /// Alias to fully-qualified namespace.
    pub namespaces: BTreeMap<String, String>,
}

impl ClassDescriptor {
    /// Extracts the descriptor from a parsed class document.
    ///
    /// Fields of the wrong shape are left empty; shape errors are reported by
    /// the class validator, not here.
    pub fn from_node(document: &SourceNode) -> Self {
        let mut descriptor = ClassDescriptor::default();

        if let Some(name) = document.get("Name") {
            descriptor.name = name.key_text();
            descriptor.name_position = name.position.clone();
        }

        if let Some(entries) = document.get("Namespaces").and_then(SourceNode::as_mapping) {
            for (alias, namespace) in entries {
                if let (Some(alias), Some(namespace)) = (alias.key_text(), namespace.key_text()) {
                    descriptor.namespaces.insert(alias, namespace);
                }
            }
        }

        descriptor
    }

    /// `namespaces["="] + "." + name`, when both are known.
    pub fn qualified_name(&self) -> Option<String> {
        let namespace = self.namespaces.get(DEFAULT_NAMESPACE)?;
        let name = self.name.as_ref()?;
        Some(format!("{}.{}", namespace, name))
    }
}

/// What the namespace check needs to know about the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDescriptor {
    /// Fully-qualified class name to path under `Classes/`.
    pub classes: BTreeMap<String, String>,
}

impl ManifestDescriptor {
    pub fn from_node(document: &SourceNode) -> Self {
        let mut descriptor = ManifestDescriptor::default();

        if let Some(entries) = document.get("Classes").and_then(SourceNode::as_mapping) {
            for (class, file) in entries {
                if let (Some(class), Some(file)) = (class.key_text(), file.key_text()) {
                    descriptor.classes.insert(class, file);
                }
            }
        }

        descriptor
    }

    pub fn declares(&self, qualified: &str) -> bool {
        self.classes.contains_key(qualified)
    }
}

/// Checks that the class's qualified name is registered in the manifest.
///
/// Yields nothing when the class has no `"="` namespace or no name.
///
/// # Examples
///
/// ```rust
/// use mplcheck::validation::namespace::{check_namespace, ClassDescriptor, ManifestDescriptor};
///
/// let mut manifest = ManifestDescriptor::default();
/// manifest.classes.insert("a.b.C".into(), "C.yaml".into());
///
/// let mut class = ClassDescriptor::default();
/// class.namespaces.insert("=".into(), "a.b".into());
/// class.name = Some("C".into());
/// assert!(check_namespace(&class, &manifest).is_none());
///
/// class.name = Some("D".into());
/// let diagnostic = check_namespace(&class, &manifest).unwrap();
/// assert_eq!(diagnostic.code, "E060");
/// ```
pub fn check_namespace(class: &ClassDescriptor, manifest: &ManifestDescriptor) -> Option<Diagnostic> {
    let qualified = class.qualified_name()?;
    if manifest.declares(&qualified) {
        return None;
    }

    tracing::debug!(%qualified, "class is not registered in manifest");
    Some(Diagnostic::at_position(
        DiagnosticKind::NamespaceMismatch {
            class: class.name.clone().unwrap_or_default(),
            qualified,
        },
        class.name_position.as_ref(),
    ))
}
