//! Configuration types for batch operations.
//!
//! All tunable behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Every operation takes the same config so a caller
//! can set it up once and run several operations in a row.

use crate::error::MediaBeltError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default JPEG quality used whenever a JPEG is encoded.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Configuration shared by every batch operation.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use mediabelt::{BatchConfig, PageLayout, PaperSize};
///
/// let config = BatchConfig::builder()
///     .page_layout(PageLayout::Fit(PaperSize::A4))
///     .jpeg_quality(85)
///     .build()
///     .unwrap();
/// assert_eq!(config.jpeg_quality, 85);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// How each image is placed on its page when assembling a PDF.
    /// Default: [`PageLayout::Native`].
    ///
    /// One layout applies to the whole document; pages are never mixed.
    pub page_layout: PageLayout,

    /// JPEG quality (1–100). Default: 90.
    pub jpeg_quality: u8,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_layout: PageLayout::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("page_layout", &self.page_layout)
            .field("jpeg_quality", &self.jpeg_quality)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn page_layout(mut self, layout: PageLayout) -> Self {
        self.config.page_layout = layout;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, MediaBeltError> {
        let c = &self.config;
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(MediaBeltError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if let PageLayout::Fit(paper) = c.page_layout {
            let (w, h) = paper.dimensions();
            if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
                return Err(MediaBeltError::InvalidConfig(format!(
                    "Page size must be positive, got {w}×{h} pt"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Page geometry policy for PDF assembly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageLayout {
    /// Page size equals the image size (1 px = 1 pt), image drawn at the
    /// origin without scaling. (default)
    #[default]
    Native,
    /// Fixed page size; the image is scaled uniformly to the largest size
    /// that fits and centred on the page.
    Fit(PaperSize),
}

/// Target page size for [`PageLayout::Fit`], in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    /// ISO A4, 210 × 297 mm.
    A4,
    /// US Letter, 8.5 × 11 in.
    Letter,
    /// Arbitrary size in points.
    Custom { width: f32, height: f32 },
}

impl PaperSize {
    /// `(width, height)` in points.
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            PaperSize::A4 => (595.275_6, 841.889_8),
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Custom { width, height } => (width, height),
        }
    }
}

impl std::str::FromStr for PaperSize {
    type Err = MediaBeltError;

    /// Accepts `a4`, `letter`, or `<width>x<height>` in points.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "a4" => return Ok(PaperSize::A4),
            "letter" => return Ok(PaperSize::Letter),
            _ => {}
        }
        let (w, h) = s.split_once('x').ok_or_else(|| {
            MediaBeltError::InvalidArgument(format!(
                "Unknown page size '{s}': expected a4, letter or <width>x<height>"
            ))
        })?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .ok()
                .filter(|n| n.is_finite() && *n > 0.0)
                .ok_or_else(|| {
                    MediaBeltError::InvalidArgument(format!("Invalid page dimension '{v}'"))
                })
        };
        Ok(PaperSize::Custom {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}
