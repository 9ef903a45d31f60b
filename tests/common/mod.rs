//! Shared fixtures: packages written into temporary directories.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use mplcheck::ast::SourceNode;
use mplcheck::package::Package;
use mplcheck::syntax::parse_document;
use tempfile::TempDir;

pub const MANIFEST: &str = "\
Format: '1.3'
Type: Application
FullName: org.openstack.test
Name: Test application
Description: Integration with world.
Author: Mirantis, Inc
Tags: [Openstack, Test]
Require:
  murano-test-plugin:
Classes:
  org.openstack.test.Instance: Instance.yaml
UI: ui.yaml
Logo: logo.png
";

pub const INSTANCE_CLASS: &str = "\
Name: Instance
Namespaces:
  =: org.openstack.test
  res: io.murano.resources
  std: io.murano
Extends: res:LinuxMuranoInstance
Properties:
  ports:
    Contract:
      - $.class(NeutronPort).notNull()
    Default: []
Methods:
  prepareStackTemplate:
    Arguments:
      instanceTemplate:
        Contract: {}
    Body:
      - For: port
        In: $.ports
        Do:
          - $port.deploy()
          - $template:
              resources:
                $.name:
                  properties:
                    networks:
                      - port: $port.getRef()
          - $instanceTemplate: $instanceTemplate.mergeWith($template)
      - Return: $instanceTemplate
";

pub const UI_FORMS: &str = "\
Version: 2
Application:
  instance:
    type: org.openstack.test.Instance
Forms:
  - instanceConfiguration:
      fields:
        - name: title
          type: string
          label: Title
          required: true
          description: Instance title
";

/// Parses YAML text as a document of `file`.
pub fn yaml(text: &str) -> SourceNode {
    parse_document(text, Some("test.yaml")).unwrap()
}

/// A package unpacked into a temporary directory.
pub struct PackageFixture {
    dir: TempDir,
}

impl PackageFixture {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// A complete package that checks clean.
    pub fn valid() -> Self {
        Self::empty()
            .with("manifest.yaml", MANIFEST)
            .with("Classes/Instance.yaml", INSTANCE_CLASS)
            .with("UI/ui.yaml", UI_FORMS)
            .with("logo.png", "not really a png")
    }

    pub fn with(self, path: &str, content: &str) -> Self {
        let target = self.dir.path().join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(target, content).unwrap();
        self
    }

    pub fn without(self, path: &str) -> Self {
        fs::remove_file(self.dir.path().join(path)).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn package(&self) -> Package {
        Package::open(self.path()).unwrap()
    }

    /// Zips the fixture into `<tempdir>/package.zip`, keeping `/` paths.
    pub fn zip_into(&self, target: &TempDir) -> PathBuf {
        let archive_path = target.path().join("package.zip");
        let file = fs::File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        let package = self.package();
        for path in package.list_files(None).unwrap() {
            writer.start_file(path.as_str(), options).unwrap();
            writer
                .write_all(&fs::read(self.path().join(&path)).unwrap())
                .unwrap();
        }
        writer.finish().unwrap();
        archive_path
    }
}
