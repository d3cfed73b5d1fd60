//! Output writing: every artifact lands via a temp file + rename.
//!
//! The temp file is created next to the destination so the final rename
//! never crosses filesystems. If anything fails before `persist`, dropping
//! the `NamedTempFile` deletes it and the destination is left untouched.

use crate::error::MediaBeltError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Name used for PDF outputs when the caller gives none.
pub const DEFAULT_PDF_OUTPUT: &str = "output.pdf";

/// Name used for stitched images when the caller gives none.
pub const DEFAULT_IMAGE_OUTPUT: &str = "output.jpg";

/// `name` as a path, or `default` when it is empty or blank.
pub fn output_path_or(name: &str, default: &str) -> PathBuf {
    if name.trim().is_empty() {
        PathBuf::from(default)
    } else {
        PathBuf::from(name)
    }
}

/// Directory a temp file for `path` should live in.
fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Write `bytes` to `path`, replacing any existing file atomically.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), MediaBeltError> {
    let write_err = |source| MediaBeltError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(staging_dir(path)).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
