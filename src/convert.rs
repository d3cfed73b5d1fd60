//! Public entry points: one function per directory-scoped operation.
//!
//! Each function resolves its batch from a folder (see
//! [`crate::pipeline::input::resolve_batch`]) and hands it to the matching
//! pipeline stage. A folder that is missing or holds no matching files is a
//! successful no-op.

use crate::config::BatchConfig;
use crate::error::MediaBeltError;
use crate::output::{AssemblyReport, ConversionReport, DigestPair, ExtractionReport, StitchReport};
use crate::pipeline::{assemble, digest, extract, input, merge, raster, stitch};
use std::path::Path;

/// Extension collected by [`webp_to_jpg`].
pub const WEBP_EXTENSION: &str = "webp";
/// Default extension collected by [`images_to_pdf`] and [`merge_images`].
pub const JPG_EXTENSION: &str = "jpg";
/// Extension collected by [`merge_pdfs`].
pub const PDF_EXTENSION: &str = "pdf";

/// Compare two files by SHA-256 digest.
///
/// # Example
/// ```rust,no_run
/// let pair = mediabelt::hash_compare("a.iso", "b.iso")?;
/// println!("{} {}", pair.first.hex, if pair.equal { "match" } else { "differ" });
/// # Ok::<(), mediabelt::MediaBeltError>(())
/// ```
pub fn hash_compare(
    first: impl AsRef<Path>,
    second: impl AsRef<Path>,
) -> Result<DigestPair, MediaBeltError> {
    digest::compare_files(first.as_ref(), second.as_ref())
}

/// Convert every `.webp` in `folder` to a `.jpg` beside it.
pub fn webp_to_jpg(
    folder: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<ConversionReport, MediaBeltError> {
    let batch = input::resolve_batch(folder.as_ref(), WEBP_EXTENSION)?;
    raster::convert_batch(&batch, raster::RasterFormat::Jpeg, config)
}

/// Put every `.<extension>` image in `folder` on its own page of one PDF.
///
/// Empty `output_name` writes `output.pdf`.
///
/// # Example
/// ```rust,no_run
/// use mediabelt::{images_to_pdf, BatchConfig};
///
/// let report = images_to_pdf("scans/", "scans.pdf", "jpg", &BatchConfig::default())?;
/// println!("{} pages", report.pages);
/// # Ok::<(), mediabelt::MediaBeltError>(())
/// ```
pub fn images_to_pdf(
    folder: impl AsRef<Path>,
    output_name: &str,
    extension: &str,
    config: &BatchConfig,
) -> Result<AssemblyReport, MediaBeltError> {
    let batch = input::resolve_batch(folder.as_ref(), extension)?;
    assemble::assemble_pdf(&batch, output_name, config)
}

/// Concatenate every `.pdf` in `folder` into one PDF.
///
/// Empty `output_name` writes `output.pdf`.
pub fn merge_pdfs(
    folder: impl AsRef<Path>,
    output_name: &str,
    config: &BatchConfig,
) -> Result<AssemblyReport, MediaBeltError> {
    let batch = input::resolve_batch(folder.as_ref(), PDF_EXTENSION)?;
    merge::merge_pdfs(&batch, output_name, config)
}

/// Stack every `.<extension>` image in `folder` vertically into one image.
///
/// Empty `output_name` writes `output.jpg`.
pub fn merge_images(
    folder: impl AsRef<Path>,
    output_name: &str,
    extension: &str,
    config: &BatchConfig,
) -> Result<StitchReport, MediaBeltError> {
    let batch = input::resolve_batch(folder.as_ref(), extension)?;
    stitch::stitch_batch(&batch, output_name, config)
}

/// Write the embedded images of `pdf` into `output_dir`
/// (the PDF's directory when `None`).
pub fn extract_images(
    pdf: impl AsRef<Path>,
    output_dir: Option<&Path>,
    config: &BatchConfig,
) -> Result<ExtractionReport, MediaBeltError> {
    extract::extract_images(pdf.as_ref(), output_dir, config)
}
