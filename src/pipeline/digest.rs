//! Content hashing: SHA-256 over the whole file, rendered as uppercase hex.

use crate::error::MediaBeltError;
use crate::output::{DigestPair, FileDigest};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// Hash one file. The file is read fully into memory.
pub fn digest_file(path: &Path) -> Result<FileDigest, MediaBeltError> {
    let bytes = std::fs::read(path).map_err(|e| MediaBeltError::from_read(path, e))?;
    let hex = hex::encode_upper(Sha256::digest(&bytes));
    debug!("{} → {}", path.display(), hex);
    Ok(FileDigest {
        path: path.to_path_buf(),
        hex,
    })
}

/// Hash two files and report whether their contents match.
pub fn compare_files(first: &Path, second: &Path) -> Result<DigestPair, MediaBeltError> {
    let first = digest_file(first)?;
    let second = digest_file(second)?;
    let equal = first.hex == second.hex;
    Ok(DigestPair {
        first,
        second,
        equal,
    })
}
