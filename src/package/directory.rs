use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{PackageError, PackageSource};

/// A package unpacked on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Returns `None` when `path` is not a directory.
    pub fn try_open(path: &Path) -> Result<Option<Self>, PackageError> {
        if !path.is_dir() {
            return Ok(None);
        }
        Ok(Some(Self {
            root: path.to_path_buf(),
        }))
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect();
        Some(parts.join("/"))
    }
}

impl PackageSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn list_files(&self, subdir: Option<&str>) -> Result<Vec<String>, PackageError> {
        let start = match subdir {
            Some(dir) => self.root.join(dir),
            None => self.root.clone(),
        };
        if !start.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&start) {
            let entry = entry.map_err(|e| PackageError::Io {
                path: start.display().to_string(),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            files.extend(self.relative(entry.path()));
        }
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &str) -> bool {
        self.root.join(path).exists()
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, PackageError> {
        std::fs::read(self.root.join(path)).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => PackageError::MissingFile {
                path: path.to_string(),
            },
            _ => PackageError::Io {
                path: path.to_string(),
                source,
            },
        })
    }
}
