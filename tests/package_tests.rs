// tests/package_tests.rs

mod common;

use std::sync::Arc;

use common::PackageFixture;
use mplcheck::package::{ArchiveSource, Package, PackageError, PackageSource};

fn fixture() -> PackageFixture {
    PackageFixture::empty()
        .with("1.yaml", "a: 1\n")
        .with("2.sh", "echo\n")
        .with("sub/3.yaml", "b: 2\n")
        .with("subdir/4.yaml", "c: 3\n")
}

mod directory {
    use super::*;

    #[test]
    fn lists_relative_sorted_paths() {
        let fixture = fixture();
        let package = fixture.package();
        assert_eq!(
            package.list_files(None).unwrap(),
            ["1.yaml", "2.sh", "sub/3.yaml", "subdir/4.yaml"]
        );
        assert_eq!(package.list_files(Some("sub")).unwrap(), ["sub/3.yaml"]);
        assert!(package.list_files(Some("missing")).unwrap().is_empty());
    }

    #[test]
    fn exists_covers_files_and_directories() {
        let fixture = fixture();
        let package = fixture.package();
        assert!(package.exists("1.yaml"));
        assert!(package.exists("sub"));
        assert!(!package.exists("sub/4.yaml"));
    }

    #[test]
    fn search_for_reads_matching_files() {
        let fixture = fixture();
        let package = fixture.package();
        let paths: Vec<_> = package
            .search_for(r".*\.yaml$", None)
            .unwrap()
            .iter()
            .map(|file| file.path.clone())
            .collect();
        assert_eq!(paths, ["1.yaml", "sub/3.yaml", "subdir/4.yaml"]);

        let nested = package.search_for(r"\.yaml$", Some("sub")).unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].path, "sub/3.yaml");
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let fixture = fixture();
        let package = fixture.package();
        assert!(matches!(package.search_for("(", None), Err(PackageError::Pattern(_))));
    }

    #[test]
    fn reads_are_cached() {
        let fixture = fixture();
        let package = fixture.package();
        let first = package.read("1.yaml").unwrap();
        let second = package.read("1.yaml").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.raw, "a: 1\n");
        assert_eq!(first.document().unwrap().get("a").map(|n| n.to_string()).as_deref(), Some("1"));
    }

    #[test]
    fn broken_yaml_keeps_raw_text() {
        let fixture = PackageFixture::empty().with("bad.yaml", "a: [1, 2\n");
        let package = fixture.package();
        let file = package.read("bad.yaml").unwrap();
        assert_eq!(file.raw, "a: [1, 2\n");
        let error = file.document().unwrap_err();
        assert_eq!(error.file.as_deref(), Some("bad.yaml"));
        assert!(error.line.is_some());
    }

    #[test]
    fn missing_file() {
        let fixture = fixture();
        let package = fixture.package();
        assert!(matches!(package.read("nope.yaml"), Err(PackageError::MissingFile { .. })));
    }

    #[test]
    fn files_are_read_lazily_from_disk() {
        let fixture = fixture();
        let package = fixture.package();
        drop(fixture);

        assert!(!package.exists("1.yaml"));
        assert!(matches!(package.read("1.yaml"), Err(PackageError::MissingFile { .. })));
    }
}

mod archive {
    use super::*;

    #[test]
    fn behaves_like_a_directory() {
        let fixture = fixture();
        let target = tempfile::tempdir().unwrap();
        let archive = Package::open(fixture.zip_into(&target)).unwrap();
        let directory = fixture.package();

        assert_eq!(archive.list_files(None).unwrap(), directory.list_files(None).unwrap());
        assert_eq!(
            archive.list_files(Some("sub")).unwrap(),
            directory.list_files(Some("sub")).unwrap()
        );
        assert!(archive.exists("sub"));
        assert!(archive.exists("sub/"));
        assert!(!archive.exists("su"));
        assert_eq!(archive.read("sub/3.yaml").unwrap().raw, "b: 2\n");
    }

    #[test]
    fn in_memory_entries() {
        let source = ArchiveSource::from_entries(
            "memory.zip",
            vec![("Classes/A.yaml".to_string(), b"Name: A\n".to_vec())],
        );
        assert_eq!(source.describe(), "memory.zip");
        assert!(source.exists("Classes"));
        assert_eq!(source.list_files(Some("Classes/")).unwrap(), ["Classes/A.yaml"]);

        let package = Package::new(Box::new(source));
        assert_eq!(package.search_for("^Classes/", None).unwrap().len(), 1);
    }
}

mod open {
    use super::*;

    #[test]
    fn missing_path() {
        let result = Package::open("/definitely/not/here");
        assert!(matches!(result, Err(PackageError::NotFound { .. })));
    }

    #[test]
    fn plain_file_is_not_a_package() {
        let fixture = PackageFixture::empty().with("notes.txt", "these are plain notes, not a zip archive\n");
        let result = Package::open(fixture.path().join("notes.txt"));
        assert!(matches!(result, Err(PackageError::UnsupportedFormat { .. })));
    }
}
