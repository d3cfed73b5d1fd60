//! Page synthesis: one raster image → one PDF page.
//!
//! Each page gets its own image XObject and a four-operator content stream
//! that maps the unit square onto the image's placement rectangle:
//!
//! ```text
//! q  w 0 0 h x y cm  /Im0 Do  Q
//! ```
//!
//! Geometry is computed by [`place_image`] so it can be tested without
//! touching lopdf.
//!
//! Baseline or progressive 8-bit JPEGs with one or three components are
//! embedded byte for byte under `DCTDecode`, so a scan keeps its original
//! compression. Every other source is decoded and stored as zlib-compressed
//! 8-bit DeviceRGB.

use crate::config::PageLayout;
use crate::error::MediaBeltError;
use crate::pipeline::raster::decode_bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Resource name of the single image drawn on every page.
const IMAGE_RESOURCE: &str = "Im0";

/// Where an image lands on its page, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page_width: f32,
    pub page_height: f32,
    /// Lower-left corner of the drawn image.
    pub x: f32,
    pub y: f32,
    /// Drawn size of the image.
    pub width: f32,
    pub height: f32,
}

/// Compute page size and image rectangle for an `img_w`×`img_h` image.
///
/// * `Native`: the page is exactly the image, drawn at the origin.
/// * `Fit`: scale by `min(pageW/imgW, pageH/imgH)` and centre.
pub fn place_image(img_w: u32, img_h: u32, layout: PageLayout) -> Placement {
    let (iw, ih) = (img_w as f32, img_h as f32);
    match layout {
        PageLayout::Native => Placement {
            page_width: iw,
            page_height: ih,
            x: 0.0,
            y: 0.0,
            width: iw,
            height: ih,
        },
        PageLayout::Fit(paper) => {
            let (pw, ph) = paper.dimensions();
            let scale = (pw / iw).min(ph / ih);
            let (w, h) = (iw * scale, ih * scale);
            Placement {
                page_width: pw,
                page_height: ph,
                x: (pw - w) / 2.0,
                y: (ph - h) / 2.0,
                width: w,
                height: h,
            }
        }
    }
}

/// Turns decoded images into pages of a [`Document`] under one layout.
#[derive(Debug, Clone, Copy)]
pub struct PageSynthesizer {
    layout: PageLayout,
}

impl PageSynthesizer {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    /// Add one page showing `image` to `doc`, parented to `parent`.
    ///
    /// Returns the new page's object id; the caller links it into the page
    /// tree's `Kids`.
    pub fn add_page(
        &self,
        doc: &mut Document,
        parent: ObjectId,
        image: &PageImage,
    ) -> Result<ObjectId, MediaBeltError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(MediaBeltError::Internal(format!(
                "cannot place a {w}x{h} image on a page"
            )));
        }

        let placement = place_image(w, h, self.layout);
        debug!(
            "Page {}x{} pt, image {}x{} at ({}, {})",
            placement.page_width,
            placement.page_height,
            placement.width,
            placement.height,
            placement.x,
            placement.y
        );

        let image_id = doc.add_object(image.to_xobject()?);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        placement.width.into(),
                        0.into(),
                        0.into(),
                        placement.height.into(),
                        placement.x.into(),
                        placement.y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| MediaBeltError::DocumentBuildFailed(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let media_box: Vec<Object> = match self.layout {
            PageLayout::Native => vec![0.into(), 0.into(), i64::from(w).into(), i64::from(h).into()],
            PageLayout::Fit(_) => vec![
                0.into(),
                0.into(),
                placement.page_width.into(),
                placement.page_height.into(),
            ],
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "MediaBox" => media_box,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE => image_id,
                },
            },
        });
        Ok(page_id)
    }
}

/// Pixel source for one page.
#[derive(Debug, Clone)]
pub enum PageImage {
    /// A JPEG stream embedded as-is.
    Jpeg {
        data: Vec<u8>,
        width: u32,
        height: u32,
        gray: bool,
    },
    /// Decoded pixels, re-encoded as Flate RGB.
    Pixels(DynamicImage),
}

impl PageImage {
    /// Read and decode `path`.
    pub fn load(path: &Path) -> Result<Self, MediaBeltError> {
        let bytes = std::fs::read(path).map_err(|e| MediaBeltError::from_read(path, e))?;
        Self::from_encoded(path, bytes)
    }

    /// Decode `bytes`, keeping them for passthrough when they are a JPEG a
    /// PDF reader can show directly.
    ///
    /// The full decode still runs so a truncated or corrupt JPEG fails here
    /// rather than in the reader.
    pub fn from_encoded(path: &Path, bytes: Vec<u8>) -> Result<Self, MediaBeltError> {
        let img = decode_bytes(path, &bytes)?;
        match jpeg_frame(&bytes) {
            Some(frame)
                if matches!(frame.components, 1 | 3)
                    && (frame.width, frame.height) == (img.width(), img.height()) =>
            {
                debug!("{}: JPEG passthrough", path.display());
                Ok(PageImage::Jpeg {
                    data: bytes,
                    width: frame.width,
                    height: frame.height,
                    gray: frame.components == 1,
                })
            }
            _ => Ok(PageImage::Pixels(img)),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            PageImage::Jpeg { width, height, .. } => (*width, *height),
            PageImage::Pixels(img) => (img.width(), img.height()),
        }
    }

    fn to_xobject(&self) -> Result<Stream, MediaBeltError> {
        match self {
            PageImage::Jpeg {
                data,
                width,
                height,
                gray,
            } => {
                let color_space = if *gray { "DeviceGray" } else { "DeviceRGB" };
                Ok(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => i64::from(*width),
                        "Height" => i64::from(*height),
                        "ColorSpace" => color_space,
                        "BitsPerComponent" => 8,
                        "Filter" => "DCTDecode",
                    },
                    data.clone(),
                )
                .with_compression(false))
            }
            PageImage::Pixels(img) => flate_xobject(img),
        }
    }
}

impl From<DynamicImage> for PageImage {
    fn from(img: DynamicImage) -> Self {
        PageImage::Pixels(img)
    }
}

/// Fields of a JPEG start-of-frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    width: u32,
    height: u32,
    components: u8,
}

/// Find the frame header of an 8-bit Huffman-coded JPEG.
///
/// Returns `None` for anything else: not a JPEG, lossless, hierarchical or
/// arithmetic-coded frames, 12-bit samples, or a scan before any frame.
fn jpeg_frame(data: &[u8]) -> Option<JpegFrame> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        // Fill bytes and parameterless markers.
        if marker == 0xFF {
            i += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        let len = usize::from(u16::from_be_bytes([*data.get(i + 2)?, *data.get(i + 3)?]));
        if len < 2 {
            return None;
        }
        let body = data.get(i + 4..i + 2 + len)?;
        match marker {
            0xC0..=0xC2 => {
                if body.len() < 6 || body[0] != 8 {
                    return None;
                }
                return Some(JpegFrame {
                    height: u32::from(u16::from_be_bytes([body[1], body[2]])),
                    width: u32::from(u16::from_be_bytes([body[3], body[4]])),
                    components: body[5],
                });
            }
            0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF | 0xDA | 0xD9 => return None,
            _ => {}
        }
        i += 2 + len;
    }
    None
}

/// Build an 8-bit DeviceRGB image XObject with zlib-compressed samples.
fn flate_xobject(img: &DynamicImage) -> Result<Stream, MediaBeltError> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb.as_raw())
        .and_then(|_| encoder.flush())
        .map_err(|e| MediaBeltError::DocumentBuildFailed(format!("image compression: {e}")))?;
    let data = encoder
        .finish()
        .map_err(|e| MediaBeltError::DocumentBuildFailed(format!("image compression: {e}")))?;

    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(w),
            "Height" => i64::from(h),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        data,
    ))
}
