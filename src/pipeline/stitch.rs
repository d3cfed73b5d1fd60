//! Image stitching: stack a batch of images vertically on one canvas.
//!
//! Images are drawn top-to-bottom in batch order, left-aligned, with a
//! one-pixel black separator row between neighbours. The canvas is as wide
//! as the widest image; narrower images leave black on their right.
//!
//! Dimensions are read from the headers first so the canvas can be
//! allocated up front; each image is then decoded, drawn and dropped before
//! the next one is read.

use crate::config::BatchConfig;
use crate::error::MediaBeltError;
use crate::output::StitchReport;
use crate::pipeline::input::FileBatch;
use crate::pipeline::raster::{decode_image, encode_image, RasterFormat};
use crate::pipeline::sink::{output_path_or, write_atomically, DEFAULT_IMAGE_OUTPUT};
use crate::progress::Progress;
use image::{imageops, DynamicImage, ImageError, ImageReader, RgbImage};
use std::path::Path;
use tracing::{debug, info};

/// Height of the separator row between consecutive images.
pub const SEPARATOR_PX: u32 = 1;

/// Canvas size for images of the given `(width, height)`s.
///
/// `None` if the summed height does not fit in a `u32`.
pub fn canvas_size(dims: &[(u32, u32)]) -> Option<(u32, u32)> {
    let width = dims.iter().map(|&(w, _)| w).max().unwrap_or(0);
    let heights: u64 = dims.iter().map(|&(_, h)| u64::from(h)).sum();
    let separators = u64::from(SEPARATOR_PX) * dims.len().saturating_sub(1) as u64;
    let height = u32::try_from(heights + separators).ok()?;
    Some((width, height))
}

/// Read an image's dimensions from its header without decoding pixels.
fn probe_dimensions(path: &Path) -> Result<(u32, u32), MediaBeltError> {
    let decode_err = |e: ImageError| match e {
        ImageError::IoError(io) => MediaBeltError::from_read(path, io),
        other => MediaBeltError::DecodeFailed {
            path: path.to_path_buf(),
            detail: other.to_string(),
        },
    };
    ImageReader::open(path)
        .map_err(|e| MediaBeltError::from_read(path, e))?
        .with_guessed_format()
        .map_err(|e| MediaBeltError::from_read(path, e))?
        .into_dimensions()
        .map_err(decode_err)
}

/// A canvas being filled top-to-bottom.
struct Column {
    canvas: RgbImage,
    y: i64,
}

impl Column {
    fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbImage::new(width, height),
            y: 0,
        }
    }

    /// Draw `img` at x = 0 below everything drawn so far.
    fn draw(&mut self, img: &RgbImage) {
        imageops::replace(&mut self.canvas, img, 0, self.y);
        self.y += i64::from(img.height()) + i64::from(SEPARATOR_PX);
    }
}

/// Stitch every image in `batch` into one image written to `output_name`
/// (`output.jpg` when empty). The output format follows the name's
/// extension (`.jpg`, `.jpeg` or `.png`).
///
/// An empty batch writes nothing. Any image that cannot be decoded aborts
/// the operation before the output is written.
pub fn stitch_batch(
    batch: &FileBatch,
    output_name: &str,
    config: &BatchConfig,
) -> Result<StitchReport, MediaBeltError> {
    if batch.is_empty() {
        info!("No images to stitch");
        return Ok(StitchReport::default());
    }
    let output = output_path_or(output_name, DEFAULT_IMAGE_OUTPUT);
    let format = RasterFormat::from_path(&output)
        .ok_or_else(|| MediaBeltError::UnsupportedFormat {
            path: output.clone(),
        })?;

    let dims = batch
        .iter()
        .map(|f| probe_dimensions(f.path()))
        .collect::<Result<Vec<_>, _>>()?;
    let (width, height) = canvas_size(&dims).ok_or_else(|| MediaBeltError::EncodeFailed {
        path: output.clone(),
        detail: "combined image height exceeds u32::MAX".into(),
    })?;
    debug!("Canvas {}x{} for {} image(s)", width, height, dims.len());

    let progress = Progress::new(config.progress_callback.as_ref(), batch.len());
    let mut column = Column::new(width, height);
    for (i, file) in batch.iter().enumerate() {
        progress.file_start(i, file.path());
        let img = decode_image(file.path())?.to_rgb8();
        column.draw(&img);
        progress.file_complete(i, file.path());
    }

    let bytes = encode_image(
        &DynamicImage::ImageRgb8(column.canvas),
        format,
        config.jpeg_quality,
        &output,
    )?;
    write_atomically(&output, &bytes)?;
    progress.finish(Some(&output));

    info!("Stitched {} image(s) into {}", batch.len(), output.display());
    Ok(StitchReport {
        output: Some(output),
        width,
        height,
        images: batch.len(),
    })
}
