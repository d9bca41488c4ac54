//! Zip a staged directory for download.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{BcError, Result};
use crate::storage::fs::list_files_recursive;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub files: usize,
    pub sha256: String,
}

/// Write every file under `src` into a zip at `dest`.
///
/// Entries are added in sorted order with `/` separators, under `prefix/`
/// when one is given, so the same tree always produces the same entry list.
pub fn zip_dir(src: &Path, dest: &Path, prefix: Option<&str>) -> Result<ArchiveReport> {
    if !src.is_dir() {
        return Err(BcError::NotFound(format!("directory {}", src.display())));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let files = list_files_recursive(src)?;
    let mut zip = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for rel in &files {
        let name = entry_name(rel, prefix);
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&fs::read(src.join(rel))?)?;
        debug!(entry = %name, "zipped");
    }
    zip.finish()?.flush()?;

    let sha256 = hash_file(dest)?;
    Ok(ArchiveReport {
        path: dest.to_path_buf(),
        files: files.len(),
        sha256,
    })
}

fn entry_name(rel: &Path, prefix: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        parts.push(prefix.trim_matches('/').to_string());
    }
    parts.extend(rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()));
    parts.join("/")
}

fn hash_file(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(fs::read(path)?);
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}
