//! Result types returned by each operation.
//!
//! Every report is `Serialize` so the CLI can print it with `--json`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file's SHA-256 digest as uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub path: PathBuf,
    /// 64 uppercase hex characters.
    pub hex: String,
}

/// Outcome of comparing two files by content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestPair {
    pub first: FileDigest,
    pub second: FileDigest,
    /// `true` when both digests are identical.
    pub equal: bool,
}

/// Files written by a raster conversion, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub written: Vec<PathBuf>,
}

/// Result of building a PDF (from images or by merging PDFs).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Path written, or `None` when the batch was empty and nothing was written.
    pub output: Option<PathBuf>,
    /// Pages in the written document.
    pub pages: usize,
}

/// Result of stitching images into one canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchReport {
    /// Path written, or `None` when the batch was empty.
    pub output: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    /// Number of source images drawn.
    pub images: usize,
}

/// Files written when pulling embedded images out of a PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub written: Vec<PathBuf>,
    /// Image XObjects whose encoding is not supported.
    pub skipped: usize,
}
