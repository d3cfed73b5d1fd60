//! # mediabelt
//!
//! Batch media assembly: hash comparison, raster conversion, images to PDF,
//! PDF concatenation, vertical image stitching and image extraction.
//!
//! ## Why this crate?
//!
//! Scanned pages, comic strips and screenshots tend to arrive as a folder of
//! loose files. This crate turns such a folder into one artifact in a single
//! call: a PDF with one page per image, a merged PDF, or one tall image. Files
//! are picked up by extension and processed in name order, so the output is
//! deterministic for a given directory listing.
//!
//! ## Pipeline Overview
//!
//! ```text
//! folder + extension
//!  │
//!  ├─ 1. Input     list, filter by extension, sort by name  → FileBatch
//!  ├─ 2. Stage     raster | page+assemble | merge | stitch
//!  └─ 3. Sink      temp file in the destination dir, then atomic rename
//!
//! two files ─▶ digest ─▶ DigestPair (SHA-256, uppercase hex)
//! one PDF   ─▶ extract ─▶ embedded images on disk
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mediabelt::{images_to_pdf, BatchConfig, PageLayout, PaperSize};
//!
//! fn main() -> Result<(), mediabelt::MediaBeltError> {
//!     let config = BatchConfig::builder()
//!         .page_layout(PageLayout::Fit(PaperSize::A4))
//!         .build()?;
//!     let report = images_to_pdf("scans/", "scans.pdf", "jpg", &config)?;
//!     eprintln!("{} pages → {:?}", report.pages, report.output);
//!     Ok(())
//! }
//! ```
//!
//! Every operation is also reachable through [`Operation`] and [`run`], which
//! is what the CLI uses.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mediabelt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! mediabelt = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod operation;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder, PageLayout, PaperSize};
pub use convert::{
    extract_images, hash_compare, images_to_pdf, merge_images, merge_pdfs, webp_to_jpg,
};
pub use error::{ErrorKind, MediaBeltError};
pub use operation::{run, Operation, OperationKind, OperationOutcome};
pub use output::{
    AssemblyReport, ConversionReport, DigestPair, ExtractionReport, FileDigest, StitchReport,
};
pub use pipeline::input::{resolve_batch, FileBatch, FileRef};
pub use pipeline::raster::RasterFormat;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
