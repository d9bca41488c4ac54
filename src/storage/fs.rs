//! Filesystem adapter.
//!
//! Every operation fails fast with a typed error. Directory listings skip
//! entries whose names are not valid UTF-8, with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{BcError, Result};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub name: String,
    pub is_dir: bool,
}

pub trait FileSystem {
    /// Copy `src` recursively to `dst`. `dst` must not exist yet.
    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<usize>;

    fn delete_tree(&self, path: &Path) -> Result<()>;

    /// Entries of `path` sorted by name.
    fn list_dir(&self, path: &Path) -> Result<Vec<FsEntry>>;

    fn read_file(&self, path: &Path) -> Result<String>;

    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Names of the immediate subdirectories of `path`; empty when `path`
    /// is not a directory.
    fn subdirectories(&self, path: &Path) -> Result<Vec<String>> {
        if !self.exists(path) {
            return Ok(Vec::new());
        }
        Ok(self
            .list_dir(path)?
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.name)
            .collect())
    }
}

/// [`FileSystem`] over the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<usize> {
        if !src.is_dir() {
            return Err(BcError::NotFound(format!("directory {}", src.display())));
        }
        if dst.exists() {
            return Err(BcError::AlreadyExists(format!("directory {}", dst.display())));
        }

        let mut copied = 0;
        for entry in WalkDir::new(src).follow_links(false) {
            let entry = entry?;
            let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
            let target = dst.join(rel);
            let file_type = entry.file_type();
            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
            } else if file_type.is_file() {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &target)?;
                copied += 1;
            } else {
                tracing::debug!(path = %entry.path().display(), "skipping non-regular entry");
            }
        }
        Ok(copied)
    }

    fn delete_tree(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(BcError::NotFound(format!("directory {}", path.display())));
        }
        fs::remove_dir_all(path)?;
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(dir = %path.display(), name = ?raw, "skipping non-UTF-8 entry");
                    continue;
                }
            };
            entries.push(FsEntry {
                name,
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

/// Files under `root`, relative to it, sorted.
pub fn list_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            files.push(rel.to_path_buf());
        }
    }
    Ok(files)
}
