use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::Read,
    path::Path,
};

use zip::{result::ZipError, ZipArchive};

use super::{in_subdir, PackageError, PackageSource};

/// A zip package. Every entry is read into memory when the archive is
/// opened, so later reads never touch the file again.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    origin: String,
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

impl ArchiveSource {
    /// Returns `None` when `path` is not a zip archive.
    pub fn try_open(path: &Path) -> Result<Option<Self>, PackageError> {
        let origin = path.display().to_string();
        if !path.is_file() {
            return Ok(None);
        }

        let file = File::open(path).map_err(|source| PackageError::Io {
            path: origin.clone(),
            source,
        })?;
        let mut archive = match ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(ZipError::InvalidArchive(_)) => return Ok(None),
            Err(source) => return Err(PackageError::Archive { path: origin, source }),
        };

        let mut files = BTreeMap::new();
        let mut directories = BTreeSet::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|source| PackageError::Archive {
                path: origin.clone(),
                source,
            })?;
            let name = entry.name().to_string();
            if entry.is_dir() {
                directories.insert(name.trim_end_matches('/').to_string());
                continue;
            }

            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(|source| PackageError::Io {
                path: name.clone(),
                source,
            })?;
            files.insert(name, bytes);
        }

        tracing::trace!(origin, entries = files.len(), "read archive");
        Ok(Some(Self {
            origin,
            files,
            directories,
        }))
    }

    /// Builds an archive source from in-memory entries.
    pub fn from_entries(origin: impl Into<String>, entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        Self {
            origin: origin.into(),
            files: entries.into_iter().collect(),
            directories: BTreeSet::new(),
        }
    }
}

impl PackageSource for ArchiveSource {
    fn describe(&self) -> String {
        self.origin.clone()
    }

    fn list_files(&self, subdir: Option<&str>) -> Result<Vec<String>, PackageError> {
        Ok(self
            .files
            .keys()
            .filter(|name| in_subdir(name, subdir))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        if self.files.contains_key(path) || self.directories.contains(path) {
            return true;
        }
        // directories are often implied by their entries only
        let prefix = format!("{}/", path);
        self.files.keys().any(|name| name.starts_with(&prefix))
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, PackageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| PackageError::MissingFile {
                path: path.to_string(),
            })
    }
}
