//! Package containers.
//!
//! A package is either a directory or a zip archive holding `manifest.yaml`,
//! `Classes/`, `UI/` and resources. Both are exposed through
//! [`PackageSource`]; validators only ever talk to the [`Package`] wrapper,
//! which adds parsing and a per-path cache on top.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

use crate::ast::SourceNode;
use crate::syntax::{parse_documents, YamlError};

pub mod archive;
pub mod directory;

pub use archive::ArchiveSource;
pub use directory::DirectorySource;

// =====================
// Errors
// =====================

#[derive(Debug, Error, Diagnostic)]
pub enum PackageError {
    #[error("package {path} does not exist")]
    #[diagnostic(code(mplcheck::package::not_found))]
    NotFound { path: String },

    #[error("cannot load package {path}: unexpected format")]
    #[diagnostic(
        code(mplcheck::package::format),
        help("a package is a directory or a zip archive")
    )]
    UnsupportedFormat { path: String },

    #[error("no file {path} in package")]
    #[diagnostic(code(mplcheck::package::missing_file))]
    MissingFile { path: String },

    #[error("unable to read {path}: {source}")]
    #[diagnostic(code(mplcheck::package::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("broken archive {path}: {source}")]
    #[diagnostic(code(mplcheck::package::archive))]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{path} is not valid UTF-8")]
    #[diagnostic(code(mplcheck::package::encoding))]
    NotUtf8 { path: String },

    #[error("invalid file pattern: {0}")]
    #[diagnostic(code(mplcheck::package::pattern))]
    Pattern(#[from] regex::Error),
}

// =====================
// Source capability
// =====================

/// Raw access to the files of a package.
///
/// Paths are relative to the package root and always `/`-separated, so
/// directory and archive packages look identical to callers.
pub trait PackageSource: Send + Sync {
    /// Human-readable origin, used as the file name of package-level findings.
    fn describe(&self) -> String;

    /// Every file in the package, or under `subdir`, sorted.
    fn list_files(&self, subdir: Option<&str>) -> Result<Vec<String>, PackageError>;

    /// Whether a file or directory exists.
    fn exists(&self, path: &str) -> bool;

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, PackageError>;
}

/// Keeps entries of `subdir`, matching on whole path components.
pub(crate) fn in_subdir(path: &str, subdir: Option<&str>) -> bool {
    match subdir.map(|dir| dir.trim_end_matches('/')) {
        None | Some("") => true,
        Some(dir) => path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/')),
    }
}

// =====================
// Parsed files
// =====================

/// One package file with its text and parsed YAML documents.
#[derive(Debug)]
pub struct PackageFile {
    pub path: String,
    pub raw: String,
    pub documents: Result<Vec<SourceNode>, YamlError>,
}

impl PackageFile {
    pub fn parse(path: &str, raw: String) -> Self {
        let documents = parse_documents(&raw, Some(path));
        if let Err(error) = &documents {
            tracing::debug!(path, %error, "file is not valid YAML");
        }
        Self {
            path: path.to_string(),
            raw,
            documents,
        }
    }

    /// First document of the file; a null node for an empty file.
    pub fn document(&self) -> Result<SourceNode, YamlError> {
        match &self.documents {
            Ok(documents) => Ok(documents.first().cloned().unwrap_or_else(SourceNode::null)),
            Err(error) => Err(error.clone()),
        }
    }
}

// =====================
// Package
// =====================

/// A loaded package with a cache of parsed files.
///
/// # Examples
///
/// ```rust,no_run
/// use mplcheck::package::Package;
/// let package = Package::open("./my-app.zip").unwrap();
/// for file in package.search_for(r"^UI/.*\.yaml$", None).unwrap() {
///     println!("{}", file.path);
/// }
/// ```
pub struct Package {
    source: Box<dyn PackageSource>,
    cache: Mutex<HashMap<String, Arc<PackageFile>>>,
}

impl Package {
    pub fn new(source: Box<dyn PackageSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a directory package, falling back to a zip archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PackageError::NotFound {
                path: path.display().to_string(),
            });
        }

        if let Some(source) = DirectorySource::try_open(path)? {
            tracing::debug!(path = %path.display(), "loaded directory package");
            return Ok(Self::new(Box::new(source)));
        }
        if let Some(source) = ArchiveSource::try_open(path)? {
            tracing::debug!(path = %path.display(), "loaded archive package");
            return Ok(Self::new(Box::new(source)));
        }

        Err(PackageError::UnsupportedFormat {
            path: path.display().to_string(),
        })
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub fn list_files(&self, subdir: Option<&str>) -> Result<Vec<String>, PackageError> {
        self.source.list_files(subdir)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.source.exists(path)
    }

    /// Reads and parses a file, once per path.
    pub fn read(&self, path: &str) -> Result<Arc<PackageFile>, PackageError> {
        if let Some(file) = self.lock_cache().get(path) {
            return Ok(Arc::clone(file));
        }

        let bytes = self.source.read_bytes(path)?;
        let raw = String::from_utf8(bytes).map_err(|_| PackageError::NotUtf8 {
            path: path.to_string(),
        })?;
        let file = Arc::new(PackageFile::parse(path, raw));

        // another worker may have raced us; either copy is equivalent
        self.lock_cache()
            .entry(path.to_string())
            .or_insert_with(|| Arc::clone(&file));
        Ok(file)
    }

    /// Reads every file whose path matches `pattern`.
    pub fn search_for(
        &self,
        pattern: &str,
        subdir: Option<&str>,
    ) -> Result<Vec<Arc<PackageFile>>, PackageError> {
        let regex = Regex::new(pattern)?;
        self.list_files(subdir)?
            .iter()
            .filter(|path| regex.is_match(path))
            .map(|path| self.read(path))
            .collect()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<PackageFile>>> {
        // the cache holds no invariants a panicking reader could break
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("source", &self.source.describe())
            .finish()
    }
}
