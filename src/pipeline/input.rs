//! Input resolution: turn a directory + extension into an ordered batch.
//!
//! Directory enumeration order is filesystem-dependent, so the batch is
//! always sorted by file name, case-insensitively, with the exact name as a
//! tie-breaker. Page order in assembled PDFs and the y-order of stitched
//! images come straight from this order.
//!
//! A path that is not a directory resolves to an empty batch rather than an
//! error; callers treat an empty batch as "nothing to do".

use crate::error::MediaBeltError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A resolved input file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    path: PathBuf,
    extension: String,
}

impl FileRef {
    /// Wrap a path, taking the extension tag from its file name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self { path, extension }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased extension without the leading dot (`"jpg"`).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// An ordered, duplicate-free sequence of input files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileBatch {
    files: Vec<FileRef>,
}

impl FileBatch {
    /// Build a batch from explicit paths, keeping the given order.
    ///
    /// Later duplicates of the same path are dropped.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut files: Vec<FileRef> = Vec::new();
        for p in paths {
            let f = FileRef::new(p);
            if !files.iter().any(|existing| existing.path == f.path) {
                files.push(f);
            }
        }
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRef> {
        self.files.iter()
    }

    /// Paths in batch order.
    pub fn paths(&self) -> Vec<&Path> {
        self.files.iter().map(FileRef::path).collect()
    }
}

impl<'a> IntoIterator for &'a FileBatch {
    type Item = &'a FileRef;
    type IntoIter = std::slice::Iter<'a, FileRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Normalise `"JPG"`, `"jpg"` or `".jpg"` into the suffix `".jpg"`.
fn suffix_for(extension: &str) -> String {
    format!(".{}", extension.trim().trim_start_matches('.').to_lowercase())
}

/// List the regular files in `dir` whose name ends with `extension`
/// (case-insensitive), sorted by name.
///
/// Returns an empty batch when `dir` is not a directory. Fails only when an
/// existing directory cannot be listed.
pub fn resolve_batch(dir: &Path, extension: &str) -> Result<FileBatch, MediaBeltError> {
    if !dir.is_dir() {
        debug!("Not a directory, nothing to resolve: {}", dir.display());
        return Ok(FileBatch::default());
    }

    let suffix = suffix_for(extension);
    let entries = std::fs::read_dir(dir).map_err(|e| MediaBeltError::from_read(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MediaBeltError::from_read(dir, e))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !name.ends_with(&suffix) {
            continue;
        }
        // Follows symlinks so a link to a regular file counts as one.
        if !path.is_file() {
            continue;
        }
        files.push(FileRef::new(path));
    }

    files.sort_by_cached_key(|f| {
        let name = f.file_name();
        (name.to_lowercase(), name)
    });

    info!(
        "Resolved {} '{}' file(s) in {}",
        files.len(),
        suffix,
        dir.display()
    );
    Ok(FileBatch { files })
}
