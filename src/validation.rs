//! Validators for the documents of a package.
//!
//! - [`schema`]: keyword-driven document checking shared by all file kinds
//! - [`grammar`] and [`structure`]: method body checking
//! - [`namespace`]: class name against the manifest registry
//! - [`manifest`], [`class`], [`ui`]: per file kind schemas

pub mod class;
pub mod grammar;
pub mod manifest;
pub mod namespace;
pub mod schema;
pub mod structure;
pub mod ui;

pub use namespace::{check_namespace, ClassDescriptor, ManifestDescriptor};
pub use schema::{CheckError, CheckResult, DocumentSchema};
pub use structure::{validate_block, CodeStructureChecker};
