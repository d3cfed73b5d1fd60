//! Raster decode/encode and batch format conversion.
//!
//! Decoding goes through `image::load_from_memory`, which picks the codec
//! from the file's magic bytes. A decode error is the only signal that a file
//! is corrupt, so it always aborts the batch instead of skipping the file.
//!
//! Encoded output is always 24-bit RGB: alpha is dropped and grey images are
//! expanded. JPEG cannot carry alpha anyway and keeping one colour model
//! makes stitched and converted files behave the same.

use crate::config::BatchConfig;
use crate::error::MediaBeltError;
use crate::output::ConversionReport;
use crate::pipeline::input::FileBatch;
use crate::pipeline::sink::write_atomically;
use crate::progress::Progress;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raster formats the crate can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterFormat {
    Jpeg,
    Png,
}

impl RasterFormat {
    /// File extension written for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "jpg",
            RasterFormat::Png => "png",
        }
    }

    /// Pick the format from a file name's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(RasterFormat::Jpeg),
            "png" => Some(RasterFormat::Png),
            _ => None,
        }
    }
}

/// Read and decode one image file.
pub fn decode_image(path: &Path) -> Result<DynamicImage, MediaBeltError> {
    let bytes = std::fs::read(path).map_err(|e| MediaBeltError::from_read(path, e))?;
    decode_bytes(path, &bytes)
}

/// Decode an image already read into memory. `path` names it in errors.
pub fn decode_bytes(path: &Path, bytes: &[u8]) -> Result<DynamicImage, MediaBeltError> {
    let img = image::load_from_memory(bytes).map_err(|e| MediaBeltError::DecodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(
        "Decoded {} → {}x{} px ({:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

/// Encode `img` as 24-bit RGB in `format`.
///
/// `path` is only used for error messages.
pub fn encode_image(
    img: &DynamicImage,
    format: RasterFormat,
    jpeg_quality: u8,
    path: &Path,
) -> Result<Vec<u8>, MediaBeltError> {
    let rgb = match img {
        DynamicImage::ImageRgb8(_) => None,
        other => Some(DynamicImage::ImageRgb8(other.to_rgb8())),
    };
    let rgb = rgb.as_ref().unwrap_or(img);

    let mut buf = Vec::new();
    let result = match format {
        RasterFormat::Jpeg => {
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, jpeg_quality))
        }
        RasterFormat::Png => rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png),
    };
    result.map_err(|e| MediaBeltError::EncodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(buf)
}

/// Output path for a converted file: same directory and stem, new extension.
///
/// Only the final extension is replaced, so `raw.webp/pic.webp` becomes
/// `raw.webp/pic.jpg` and `PIC.WEBP` becomes `PIC.jpg`.
pub fn derive_output_path(source: &Path, target: RasterFormat) -> PathBuf {
    source.with_extension(target.extension())
}

/// Convert every file in `batch` to `target`, writing each result next to
/// its source.
///
/// Stops at the first file that cannot be read or decoded. Files converted
/// before the failure stay on disk; nothing after it is written.
pub fn convert_batch(
    batch: &FileBatch,
    target: RasterFormat,
    config: &BatchConfig,
) -> Result<ConversionReport, MediaBeltError> {
    let mut report = ConversionReport::default();
    if batch.is_empty() {
        return Ok(report);
    }

    let progress = Progress::new(config.progress_callback.as_ref(), batch.len());
    for (i, file) in batch.iter().enumerate() {
        let src = file.path();
        progress.file_start(i, src);

        let img = decode_image(src)?;
        let dest = derive_output_path(src, target);
        let bytes = encode_image(&img, target, config.jpeg_quality, &dest)?;
        drop(img);
        write_atomically(&dest, &bytes)?;

        progress.file_complete(i, src);
        report.written.push(dest);
    }
    progress.finish(None);

    info!(
        "Converted {} file(s) to {}",
        report.written.len(),
        target.extension()
    );
    Ok(report)
}
