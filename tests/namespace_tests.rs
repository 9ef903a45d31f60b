// tests/namespace_tests.rs

mod common;

use common::yaml;
use mplcheck::validation::namespace::{check_namespace, ClassDescriptor, ManifestDescriptor};

fn manifest() -> ManifestDescriptor {
    ManifestDescriptor::from_node(&yaml("Format: 1.3\nClasses:\n  a.b.C: C.yaml\n"))
}

#[test]
fn registered_class_passes() {
    let class = ClassDescriptor::from_node(&yaml("Namespaces:\n  =: a.b\nName: C\n"));
    assert_eq!(class.qualified_name().as_deref(), Some("a.b.C"));
    assert!(check_namespace(&class, &manifest()).is_none());
}

#[test]
fn unregistered_class_is_reported_at_its_name() {
    let class = ClassDescriptor::from_node(&yaml("Namespaces:\n  =: a.b\nName: D\n"));
    let diagnostic = check_namespace(&class, &manifest()).unwrap();

    assert_eq!(diagnostic.code, "E060");
    assert_eq!(
        diagnostic.message,
        "Namespace of class \"D\" in \"a.b.D\" doesn't match namespace provided in Manifest"
    );
    assert_eq!((diagnostic.line, diagnostic.column), (Some(3), Some(7)));
    assert_eq!(diagnostic.file.as_deref(), Some("test.yaml"));
}

#[test]
fn missing_default_namespace_skips_the_check() {
    let class = ClassDescriptor::from_node(&yaml("Namespaces:\n  res: io.murano\nName: D\n"));
    assert!(check_namespace(&class, &manifest()).is_none());
}

#[test]
fn missing_name_skips_the_check() {
    let class = ClassDescriptor::from_node(&yaml("Namespaces:\n  =: a.b\n"));
    assert!(check_namespace(&class, &manifest()).is_none());
}

#[test]
fn descriptors_read_their_documents() {
    let manifest = manifest();
    assert_eq!(manifest.classes.len(), 1);
    assert_eq!(manifest.classes.get("a.b.C").map(String::as_str), Some("C.yaml"));

    let class = ClassDescriptor::from_node(&yaml(
        "Name: C\nNamespaces:\n  =: a.b\n  std: io.murano\nExtends:\n  - std:Object\n",
    ));
    assert_eq!(class.namespaces.len(), 2);
    assert_eq!(class.name.as_deref(), Some("C"));
    assert_eq!(class.name_position.as_ref().map(|p| (p.line, p.column)), Some((1, 7)));
}
