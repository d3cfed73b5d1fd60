//! Integration tests for the folder-level operations.
//!
//! Every fixture is generated in a fresh `TempDir`: images through the
//! `image` crate, PDFs by running `images_to_pdf` itself. Results are read
//! back with `image` and `lopdf`.

use image::{DynamicImage, Rgb, RgbImage};
use lopdf::{Document, Object};
use mediabelt::{
    extract_images, hash_compare, images_to_pdf, merge_images, merge_pdfs, resolve_batch, run,
    webp_to_jpg,
    BatchConfig, BatchProgressCallback, ErrorKind, MediaBeltError, Operation, OperationOutcome,
    PageLayout, PaperSize,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn solid(w: u32, h: u32, px: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
}

/// Write a solid-colour image; the format follows the extension.
fn write_image(dir: &Path, name: &str, w: u32, h: u32, px: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    solid(w, h, px).save(&path).unwrap();
    path
}

fn out(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        other => panic!("not a number: {other:?}"),
    }
}

/// `[x0, y0, x1, y1]` of every page's MediaBox, in page order.
fn media_boxes(path: &Path) -> Vec<[f32; 4]> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_object(id).unwrap().as_dict().unwrap();
            let mb = page.get(b"MediaBox").unwrap().as_array().unwrap();
            [number(&mb[0]), number(&mb[1]), number(&mb[2]), number(&mb[3])]
        })
        .collect()
}

/// `(Filter, content)` of the image drawn on every page, in page order.
fn page_images(path: &Path) -> Vec<(Vec<u8>, Vec<u8>)> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_object(id).unwrap().as_dict().unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            let (_, obj) = xobjects.iter().next().unwrap();
            let stream = doc
                .get_object(obj.as_reference().unwrap())
                .unwrap()
                .as_stream()
                .unwrap();
            let filter = stream.dict.get(b"Filter").unwrap().as_name().unwrap().to_vec();
            (filter, stream.content.clone())
        })
        .collect()
}

fn close(a: [u8; 3], b: [u8; 3]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 12)
}

// ── Resolution ───────────────────────────────────────────────────────────────

#[test]
fn resolution_is_sorted_and_case_insensitive() {
    let dir = TempDir::new().unwrap();
    for name in ["c.JPG", "B.jpg", "a.jpg", "notes.txt", "a.jpg.bak"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }
    fs::create_dir(dir.path().join("d.jpg")).unwrap();

    let first = resolve_batch(dir.path(), "jpg").unwrap();
    let names: Vec<String> = first
        .paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.jpg", "B.jpg", "c.JPG"]);

    let second = resolve_batch(dir.path(), ".JPG").unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_folder_is_an_empty_batch() {
    let dir = TempDir::new().unwrap();
    let batch = resolve_batch(&dir.path().join("nope"), "jpg").unwrap();
    assert!(batch.is_empty());
}

// ── Hash compare ─────────────────────────────────────────────────────────────

#[test]
fn hash_compare_detects_one_byte_change() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    let c = dir.path().join("c.bin");
    fs::write(&a, b"0123456789").unwrap();
    fs::write(&b, b"0123456789").unwrap();
    fs::write(&c, b"0123456780").unwrap();

    let same = hash_compare(&a, &b).unwrap();
    assert!(same.equal);
    assert_eq!(same.first.hex, same.second.hex);
    assert_eq!(same.first.hex.len(), 64);
    assert_eq!(same.first.hex, same.first.hex.to_uppercase());

    let changed = hash_compare(&a, &c).unwrap();
    assert!(!changed.equal);
    assert_ne!(changed.first.hex, changed.second.hex);
}

#[test]
fn hash_compare_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.bin");
    fs::write(&a, b"data").unwrap();

    let err = hash_compare(&a, dir.path().join("missing.bin")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(err, MediaBeltError::FileNotFound { .. }));
}

// ── Images to PDF ────────────────────────────────────────────────────────────

#[test]
fn images_to_pdf_keeps_name_order_and_native_size() {
    let dir = TempDir::new().unwrap();
    let imgs = dir.path().join("imgs");
    fs::create_dir(&imgs).unwrap();
    write_image(&imgs, "c.jpg", 30, 12, [0, 0, 255]);
    write_image(&imgs, "a.jpg", 10, 12, [255, 0, 0]);
    write_image(&imgs, "b.jpg", 20, 12, [0, 255, 0]);

    let dest = out(&dir, "book.pdf");
    let report = images_to_pdf(&imgs, &dest, "jpg", &BatchConfig::default()).unwrap();
    assert_eq!(report.pages, 3);
    assert_eq!(report.output.as_deref(), Some(Path::new(&dest)));

    let boxes = media_boxes(Path::new(&dest));
    assert_eq!(
        boxes,
        vec![
            [0.0, 0.0, 10.0, 12.0],
            [0.0, 0.0, 20.0, 12.0],
            [0.0, 0.0, 30.0, 12.0],
        ]
    );
}

#[test]
fn images_to_pdf_fit_uses_fixed_page_size() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "wide.jpg", 400, 100, [10, 20, 30]);
    write_image(dir.path(), "tall.jpg", 100, 400, [30, 20, 10]);

    let config = BatchConfig::builder()
        .page_layout(PageLayout::Fit(PaperSize::Letter))
        .build()
        .unwrap();
    let dest = out(&dir, "fit.pdf");
    let report = images_to_pdf(dir.path(), &dest, "jpg", &config).unwrap();
    assert_eq!(report.pages, 2);

    for mb in media_boxes(Path::new(&dest)) {
        assert_eq!(mb, [0.0, 0.0, 612.0, 792.0]);
    }
}

#[test]
fn images_to_pdf_empty_folder_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let dest = out(&dir, "empty.pdf");
    let report = images_to_pdf(dir.path(), &dest, "jpg", &BatchConfig::default()).unwrap();
    assert_eq!(report.output, None);
    assert_eq!(report.pages, 0);
    assert!(!Path::new(&dest).exists());
}

#[test]
fn images_to_pdf_corrupt_image_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "a.jpg", 8, 8, [1, 2, 3]);
    fs::write(dir.path().join("b.jpg"), b"definitely not a jpeg").unwrap();

    let dest = out(&dir, "broken.pdf");
    let err = images_to_pdf(dir.path(), &dest, "jpg", &BatchConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(!Path::new(&dest).exists());
}

#[test]
fn images_to_pdf_embeds_jpeg_bytes_unchanged() {
    let dir = TempDir::new().unwrap();
    let jpg = write_image(dir.path(), "scan.jpg", 24, 16, [90, 120, 150]);
    let png_dir = dir.path().join("png");
    fs::create_dir(&png_dir).unwrap();
    write_image(&png_dir, "shot.png", 24, 16, [90, 120, 150]);

    let config = BatchConfig::default();
    let from_jpg = out(&dir, "jpg.pdf");
    images_to_pdf(dir.path(), &from_jpg, "jpg", &config).unwrap();
    let pages = page_images(Path::new(&from_jpg));
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].0, b"DCTDecode");
    assert_eq!(pages[0].1, fs::read(&jpg).unwrap());

    let from_png = out(&dir, "png.pdf");
    images_to_pdf(&png_dir, &from_png, "png", &config).unwrap();
    assert_eq!(page_images(Path::new(&from_png))[0].0, b"FlateDecode");
}

// ── Merge PDFs ───────────────────────────────────────────────────────────────

#[test]
fn merge_pdfs_concatenates_in_name_order() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();

    // 1.pdf: two pages (10, 20 wide); 2.pdf: one page (30 wide).
    let first = dir.path().join("first");
    fs::create_dir(&first).unwrap();
    write_image(&first, "a.png", 10, 5, [0, 0, 0]);
    write_image(&first, "b.png", 20, 5, [0, 0, 0]);
    let second = dir.path().join("second");
    fs::create_dir(&second).unwrap();
    write_image(&second, "a.png", 30, 5, [0, 0, 0]);

    let config = BatchConfig::default();
    let one = docs.join("1.pdf");
    let two = docs.join("2.pdf");
    images_to_pdf(&first, &one.to_string_lossy(), "png", &config).unwrap();
    images_to_pdf(&second, &two.to_string_lossy(), "png", &config).unwrap();

    let dest = out(&dir, "merged.pdf");
    let report = merge_pdfs(&docs, &dest, &config).unwrap();
    assert_eq!(report.pages, 3);

    let widths: Vec<f32> = media_boxes(Path::new(&dest)).iter().map(|mb| mb[2]).collect();
    assert_eq!(widths, vec![10.0, 20.0, 30.0]);
}

#[test]
fn merge_pdfs_rejects_corrupt_input() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.pdf"), b"%PDF-1.4\nnot really").unwrap();

    let dest = out(&dir, "merged.pdf");
    let err = merge_pdfs(dir.path(), &dest, &BatchConfig::default()).unwrap_err();
    assert!(matches!(err, MediaBeltError::CorruptPdf { .. }), "got: {err:?}");
    assert!(!Path::new(&dest).exists());
}

#[test]
fn merge_pdfs_empty_folder_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let dest = out(&dir, "merged.pdf");
    let report = merge_pdfs(dir.path(), &dest, &BatchConfig::default()).unwrap();
    assert_eq!(report.output, None);
    assert_eq!(report.pages, 0);
    assert!(!Path::new(&dest).exists());
}

// ── Merge images ─────────────────────────────────────────────────────────────

#[test]
fn merge_images_stacks_with_separator() {
    let dir = TempDir::new().unwrap();
    let imgs = dir.path().join("imgs");
    fs::create_dir(&imgs).unwrap();
    let red = [255, 0, 0];
    let blue = [0, 0, 255];
    write_image(&imgs, "a.jpg", 100, 50, red);
    write_image(&imgs, "b.jpg", 80, 50, blue);

    let dest = out(&dir, "strip.png");
    let report = merge_images(&imgs, &dest, "jpg", &BatchConfig::default()).unwrap();
    assert_eq!((report.width, report.height), (100, 101));
    assert_eq!(report.images, 2);

    let canvas = image::open(&dest).unwrap().to_rgb8();
    assert_eq!(canvas.dimensions(), (100, 101));
    assert!(close(canvas.get_pixel(10, 0).0, red));
    assert!(close(canvas.get_pixel(99, 49).0, red));
    assert_eq!(canvas.get_pixel(10, 50).0, [0, 0, 0]);
    assert!(close(canvas.get_pixel(10, 51).0, blue));
    assert!(close(canvas.get_pixel(79, 100).0, blue));
    // right of the narrower image
    assert_eq!(canvas.get_pixel(90, 75).0, [0, 0, 0]);
}

#[test]
fn merge_images_single_image_has_its_own_size() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "only.png", 17, 9, [5, 5, 5]);

    let dest = out(&dir, "one.jpg");
    let report = merge_images(dir.path(), &dest, "png", &BatchConfig::default()).unwrap();
    assert_eq!((report.width, report.height), (17, 9));
    let img = image::open(&dest).unwrap();
    assert_eq!((img.width(), img.height()), (17, 9));
}

#[test]
fn merge_images_empty_folder_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let dest = out(&dir, "strip.jpg");
    let report = merge_images(dir.path(), &dest, "jpg", &BatchConfig::default()).unwrap();
    assert_eq!(report.output, None);
    assert_eq!(report.images, 0);
    assert!(!Path::new(&dest).exists());
}

#[test]
fn merge_images_corrupt_image_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "a.jpg", 8, 8, [1, 2, 3]);
    fs::write(dir.path().join("b.jpg"), b"definitely not a jpeg").unwrap();

    let dest = out(&dir, "strip.jpg");
    let err = merge_images(dir.path(), &dest, "jpg", &BatchConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("b.jpg"), "got: {err}");
    assert!(!Path::new(&dest).exists());
}

// ── Extract images ───────────────────────────────────────────────────────────

#[test]
fn extract_images_returns_png_pages_pixel_for_pixel() {
    let dir = TempDir::new().unwrap();
    let imgs = dir.path().join("imgs");
    fs::create_dir(&imgs).unwrap();
    write_image(&imgs, "a.png", 5, 3, [255, 0, 0]);
    write_image(&imgs, "b.png", 4, 6, [0, 0, 255]);

    let config = BatchConfig::default();
    let pdf = dir.path().join("album.pdf");
    images_to_pdf(&imgs, &pdf.to_string_lossy(), "png", &config).unwrap();

    let dest = dir.path().join("out").join("pages");
    let report = extract_images(&pdf, Some(&dest), &config).unwrap();
    assert_eq!(
        report.written,
        vec![dest.join("album-p1-1.png"), dest.join("album-p2-1.png")]
    );
    assert_eq!(report.skipped, 0);

    for (written, source) in report.written.iter().zip(["a.png", "b.png"]) {
        let got = image::open(written).unwrap().to_rgb8();
        let want = image::open(imgs.join(source)).unwrap().to_rgb8();
        assert_eq!(got, want);
    }
}

#[test]
fn extract_images_returns_jpeg_pages_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let imgs = dir.path().join("imgs");
    fs::create_dir(&imgs).unwrap();
    let a = write_image(&imgs, "a.jpg", 9, 9, [10, 200, 30]);
    let b = write_image(&imgs, "b.jpg", 12, 5, [200, 10, 30]);

    let config = BatchConfig::default();
    let pdf = dir.path().join("scans.pdf");
    images_to_pdf(&imgs, &pdf.to_string_lossy(), "jpg", &config).unwrap();

    let report = extract_images(&pdf, None, &config).unwrap();
    assert_eq!(
        report.written,
        vec![dir.path().join("scans-p1-1.jpg"), dir.path().join("scans-p2-1.jpg")]
    );
    assert_eq!(fs::read(&report.written[0]).unwrap(), fs::read(a).unwrap());
    assert_eq!(fs::read(&report.written[1]).unwrap(), fs::read(b).unwrap());
}

// ── WEBP to JPG ──────────────────────────────────────────────────────────────

#[test]
fn webp_to_jpg_converts_every_file() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "one.webp", 6, 4, [200, 100, 50]);
    write_image(dir.path(), "two.WEBP", 3, 3, [50, 100, 200]);

    let report = webp_to_jpg(dir.path(), &BatchConfig::default()).unwrap();
    assert_eq!(
        report.written,
        vec![dir.path().join("one.jpg"), dir.path().join("two.jpg")]
    );

    let img = image::open(dir.path().join("one.jpg")).unwrap();
    assert_eq!((img.width(), img.height()), (6, 4));
    assert!(close(img.to_rgb8().get_pixel(2, 2).0, [200, 100, 50]));
}

#[test]
fn webp_to_jpg_stops_at_corrupt_file() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "a.webp", 4, 4, [1, 2, 3]);
    fs::write(dir.path().join("b.webp"), b"RIFF....garbage").unwrap();
    write_image(dir.path(), "c.webp", 4, 4, [3, 2, 1]);

    let err = webp_to_jpg(dir.path(), &BatchConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("b.webp"), "got: {err}");

    assert!(dir.path().join("a.jpg").exists());
    assert!(!dir.path().join("b.jpg").exists());
    assert!(!dir.path().join("c.jpg").exists());
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

#[test]
fn legacy_keyword_dispatches_to_stitch() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "a.jpg", 4, 2, [0, 0, 0]);
    write_image(dir.path(), "b.jpg", 4, 3, [0, 0, 0]);
    let dest = out(&dir, "stacked.jpg");

    let folder = dir.path().to_string_lossy().into_owned();
    let op = Operation::from_args("-mi", &[folder.as_str(), dest.as_str()]).unwrap();
    match run(&op, &BatchConfig::default()).unwrap() {
        OperationOutcome::Stitched(report) => {
            assert_eq!((report.width, report.height), (4, 6));
            assert_eq!(report.output, Some(PathBuf::from(&dest)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn invalid_arguments_fail_before_io() {
    let err = Operation::from_args("-p", &[] as &[&str]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = Operation::from_args("-zip", &["anything"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl BatchProgressCallback for Recorder {
    fn on_batch_start(&self, total: usize) {
        self.0.lock().unwrap().push(format!("start {total}"));
    }
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let name = path.file_name().unwrap().to_string_lossy();
        self.0.lock().unwrap().push(format!("file {index}/{total} {name}"));
    }
    fn on_file_complete(&self, index: usize, _total: usize, _path: &Path) {
        self.0.lock().unwrap().push(format!("done {index}"));
    }
    fn on_batch_complete(&self, total: usize, output: Option<&Path>) {
        let out = output.map(|p| p.file_name().unwrap().to_string_lossy().into_owned());
        self.0.lock().unwrap().push(format!("end {total} {out:?}"));
    }
}

#[test]
fn progress_events_follow_batch_order() {
    let dir = TempDir::new().unwrap();
    let imgs = dir.path().join("imgs");
    fs::create_dir(&imgs).unwrap();
    write_image(&imgs, "b.png", 2, 2, [0, 0, 0]);
    write_image(&imgs, "a.png", 2, 2, [0, 0, 0]);

    let recorder = Arc::new(Recorder::default());
    let config = BatchConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    images_to_pdf(&imgs, &out(&dir, "p.pdf"), "png", &config).unwrap();

    let events = recorder.0.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start 2",
            "file 1/2 a.png",
            "done 1",
            "file 2/2 b.png",
            "done 2",
            "end 2 Some(\"p.pdf\")",
        ]
    );
}
