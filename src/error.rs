//! Error types for the mediabelt library.
//!
//! A single fatal error type, [`MediaBeltError`], covers every operation.
//! Batches are all-or-nothing: one unreadable or corrupt input aborts the
//! whole operation, so there is no per-file "partial success" error type.
//!
//! Variants are grouped by where the failure happened. [`MediaBeltError::kind`]
//! folds them into the coarse [`ErrorKind`] categories callers usually branch
//! on (decode vs. I/O vs. bad arguments).
//!
//! An empty directory, or one with no matching files, is *not* an error:
//! resolution returns an empty [`crate::FileBatch`] and every operation
//! treats that as "nothing to do".

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mediabelt library.
#[derive(Debug, Error)]
pub enum MediaBeltError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other failure while reading a file or listing a directory.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The image decoder produced no image (corrupt or unsupported data).
    #[error("Failed to decode image '{path}': {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Building or serialising the output document failed.
    #[error("Failed to build PDF document: {0}")]
    DocumentBuildFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The pixel buffer could not be encoded in the requested format.
    #[error("Failed to encode '{path}': {detail}")]
    EncodeFailed { path: PathBuf, detail: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Argument errors ───────────────────────────────────────────────────
    /// Unknown operation keyword or a missing required argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The output name has an extension no raster encoder is available for.
    #[error("Unsupported output format for '{path}'\nUse a .jpg, .jpeg or .png file name.")]
    UnsupportedFormat { path: PathBuf },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source raster could not be decoded.
    Decode,
    /// A source could not be opened/read, or the destination could not be written.
    Io,
    /// Unrecognised operation, missing argument or bad configuration.
    InvalidArgument,
    /// Bug or unexpected library failure.
    Internal,
}

impl MediaBeltError {
    /// Map the error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DecodeFailed { .. } => ErrorKind::Decode,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::ReadFailed { .. }
            | Self::CorruptPdf { .. }
            | Self::EncodeFailed { .. }
            | Self::OutputWriteFailed { .. } => ErrorKind::Io,
            Self::InvalidArgument(_) | Self::UnsupportedFormat { .. } | Self::InvalidConfig(_) => {
                ErrorKind::InvalidArgument
            }
            Self::DocumentBuildFailed(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Classify an `io::Error` raised while reading `path`.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::ReadFailed { path, source },
        }
    }
}

impl From<lopdf::Error> for MediaBeltError {
    fn from(e: lopdf::Error) -> Self {
        Self::DocumentBuildFailed(e.to_string())
    }
}
