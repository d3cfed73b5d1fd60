//! Image extraction: write the image XObjects embedded in a PDF to disk.
//!
//! Only encodings that map cleanly onto a file are handled:
//!
//! | Stream                                   | Written as |
//! |------------------------------------------|------------|
//! | `DCTDecode`                              | `.jpg`, bytes copied verbatim |
//! | 8-bit `DeviceRGB`/`DeviceGray`, unfiltered or `FlateDecode` without predictor | `.png` |
//!
//! Anything else (CCITT, JBIG2, JPX, indexed or CMYK colour, predictors) is
//! skipped with a warning and counted in [`ExtractionReport::skipped`].

use crate::config::BatchConfig;
use crate::error::MediaBeltError;
use crate::output::ExtractionReport;
use crate::pipeline::merge::load_pdf;
use crate::pipeline::raster::{encode_image, RasterFormat};
use crate::pipeline::sink::write_atomically;
use crate::progress::Progress;
use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do with one image stream.
enum Embedded {
    /// Already a complete JPEG file.
    Jpeg(Vec<u8>),
    /// Decoded pixels, to be written as PNG.
    Pixels(DynamicImage),
    /// Encoding we don't handle; carries the reason for the log.
    Unsupported(String),
}

/// Follow one level of indirection.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// The page's `Resources`, looking through ancestors when it inherits them.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node_id = page_id;
    for _ in 0..64 {
        let node = doc.get_object(node_id).ok()?.as_dict().ok()?;
        if let Ok(res) = node.get(b"Resources") {
            return resolve(doc, res).ok()?.as_dict().ok();
        }
        node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Filter names applied to `stream`, outermost first.
fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![n.clone()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

fn int(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).and_then(Object::as_i64).ok()
}

fn classify(doc: &Document, stream: &Stream) -> Embedded {
    let filters = filters(stream);
    match filters.as_slice() {
        [f] if f.as_slice() == b"DCTDecode" => return Embedded::Jpeg(stream.content.clone()),
        [] => {}
        [f] if f.as_slice() == b"FlateDecode" => {}
        other => {
            let names: Vec<String> = other
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect();
            return Embedded::Unsupported(format!("filter {}", names.join("+")));
        }
    }

    if let Ok(parms) = stream.dict.get(b"DecodeParms") {
        let predictor = resolve(doc, parms)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(b"Predictor"))
            .and_then(Object::as_i64)
            .unwrap_or(1);
        if predictor > 1 {
            return Embedded::Unsupported(format!("predictor {predictor}"));
        }
    }

    let (Some(w), Some(h)) = (int(&stream.dict, b"Width"), int(&stream.dict, b"Height")) else {
        return Embedded::Unsupported("missing Width/Height".into());
    };
    if int(&stream.dict, b"BitsPerComponent") != Some(8) {
        return Embedded::Unsupported("bits per component is not 8".into());
    }
    let (Ok(w), Ok(h)) = (u32::try_from(w), u32::try_from(h)) else {
        return Embedded::Unsupported(format!("bad size {w}x{h}"));
    };

    let color_space = stream
        .dict
        .get(b"ColorSpace")
        .and_then(|cs| resolve(doc, cs))
        .and_then(Object::as_name)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
    let channels: u64 = match color_space.as_slice() {
        b"DeviceRGB" => 3,
        b"DeviceGray" => 1,
        other => {
            return Embedded::Unsupported(format!(
                "colour space {}",
                String::from_utf8_lossy(other)
            ))
        }
    };

    let mut samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        let mut out = Vec::new();
        if let Err(e) = ZlibDecoder::new(stream.content.as_slice()).read_to_end(&mut out) {
            return Embedded::Unsupported(format!("inflate failed: {e}"));
        }
        out
    };

    let expected = u64::from(w) * u64::from(h) * channels;
    if (samples.len() as u64) < expected {
        return Embedded::Unsupported(format!(
            "{} sample bytes, expected {expected}",
            samples.len()
        ));
    }
    samples.truncate(expected as usize);

    let img = if channels == 3 {
        RgbImage::from_raw(w, h, samples).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(w, h, samples).map(DynamicImage::ImageLuma8)
    };
    match img {
        Some(img) => Embedded::Pixels(img),
        None => Embedded::Unsupported("pixel buffer size mismatch".into()),
    }
}

/// Write every supported embedded image of `pdf` into `output_dir`
/// (the PDF's own directory when `None`). `output_dir` is created if it
/// does not exist yet.
///
/// Files are named `<stem>-p<page>-<n>.<ext>`, pages counted from 1 and
/// `n` counting images within a page from 1 in resource-name order.
pub fn extract_images(
    pdf: &Path,
    output_dir: Option<&Path>,
    config: &BatchConfig,
) -> Result<ExtractionReport, MediaBeltError> {
    let doc = load_pdf(pdf)?;
    let out_dir: PathBuf = match output_dir {
        Some(d) => d.to_path_buf(),
        None => pdf
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    std::fs::create_dir_all(&out_dir).map_err(|source| MediaBeltError::OutputWriteFailed {
        path: out_dir.clone(),
        source,
    })?;

    let pages = doc.get_pages();
    let progress = Progress::new(config.progress_callback.as_ref(), pages.len());
    let mut report = ExtractionReport::default();

    for (i, (page_no, page_id)) in pages.into_iter().enumerate() {
        progress.file_start(i, pdf);

        let Some(xobjects) = page_resources(&doc, page_id)
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|x| resolve(&doc, x).ok())
            .and_then(|x| x.as_dict().ok())
        else {
            progress.file_complete(i, pdf);
            continue;
        };

        let mut entries: Vec<(&Vec<u8>, &Object)> = xobjects.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut n = 0;
        for (name, obj) in entries {
            let Ok(Object::Stream(stream)) = resolve(&doc, obj) else {
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|s| s == b"Image")
                .unwrap_or(false);
            if !is_image {
                continue;
            }
            n += 1;

            let base = out_dir.join(format!("{stem}-p{page_no}-{n}"));
            match classify(&doc, stream) {
                Embedded::Jpeg(bytes) => {
                    let path = base.with_extension("jpg");
                    write_atomically(&path, &bytes)?;
                    report.written.push(path);
                }
                Embedded::Pixels(img) => {
                    let path = base.with_extension("png");
                    let bytes =
                        encode_image(&img, RasterFormat::Png, config.jpeg_quality, &path)?;
                    write_atomically(&path, &bytes)?;
                    report.written.push(path);
                }
                Embedded::Unsupported(reason) => {
                    warn!(
                        "Skipping image /{} on page {}: {}",
                        String::from_utf8_lossy(name),
                        page_no,
                        reason
                    );
                    report.skipped += 1;
                }
            }
        }
        debug!("Page {}: {} image(s)", page_no, n);
        progress.file_complete(i, pdf);
    }
    progress.finish(None);

    info!(
        "Extracted {} image(s) from {} ({} skipped)",
        report.written.len(),
        pdf.display(),
        report.skipped
    );
    Ok(report)
}
