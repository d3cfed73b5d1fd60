//! Document assembly: an ordered batch of images → one PDF, one page each.
//!
//! The in-progress [`Document`] lives only in memory and is owned by the
//! assembler. It is serialised once every page has been added; any error
//! before that drops it, so no partial PDF ever reaches the output path.

use crate::config::{BatchConfig, PageLayout};
use crate::error::MediaBeltError;
use crate::output::AssemblyReport;
use crate::pipeline::input::FileBatch;
use crate::pipeline::page::{PageImage, PageSynthesizer};
use crate::pipeline::sink::{output_path_or, write_atomically, DEFAULT_PDF_OUTPUT};
use crate::progress::Progress;
use lopdf::{dictionary, Document, Object, ObjectId};
use tracing::info;

/// PDF version written for new documents.
pub(crate) const PDF_VERSION: &str = "1.5";

/// A fresh document plus the flat page tree being built for it.
///
/// Pages are appended as direct kids of one `Pages` node, in call order.
pub(crate) struct PageTree {
    pub(crate) doc: Document,
    pub(crate) pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PageTree {
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, page_id: ObjectId) {
        self.kids.push(page_id.into());
    }

    pub(crate) fn len(&self) -> usize {
        self.kids.len()
    }

    /// Write the `Pages` node and catalog, then serialise the document.
    pub(crate) fn into_bytes(mut self) -> Result<Vec<u8>, MediaBeltError> {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| MediaBeltError::DocumentBuildFailed(e.to_string()))?;
        Ok(buf)
    }
}

/// Builds one PDF from images, a page per image, under a single layout.
pub struct DocumentAssembler {
    tree: PageTree,
    synth: PageSynthesizer,
}

impl DocumentAssembler {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            tree: PageTree::new(),
            synth: PageSynthesizer::new(layout),
        }
    }

    /// Append `image` as the next page.
    pub fn push_image(&mut self, image: &PageImage) -> Result<(), MediaBeltError> {
        let page_id = self
            .synth
            .add_page(&mut self.tree.doc, self.tree.pages_id, image)?;
        self.tree.push(page_id);
        Ok(())
    }

    /// Pages added so far.
    pub fn page_count(&self) -> usize {
        self.tree.len()
    }

    /// Serialise the finished document.
    pub fn finish(self) -> Result<Vec<u8>, MediaBeltError> {
        self.tree.into_bytes()
    }
}

/// Assemble every image in `batch` into one PDF written to `output_name`
/// (`output.pdf` when empty).
///
/// An empty batch writes nothing. The first image that fails to decode
/// aborts the whole assembly.
pub fn assemble_pdf(
    batch: &FileBatch,
    output_name: &str,
    config: &BatchConfig,
) -> Result<AssemblyReport, MediaBeltError> {
    if batch.is_empty() {
        info!("No images to assemble");
        return Ok(AssemblyReport::default());
    }
    let output = output_path_or(output_name, DEFAULT_PDF_OUTPUT);

    let progress = Progress::new(config.progress_callback.as_ref(), batch.len());
    let mut assembler = DocumentAssembler::new(config.page_layout);
    for (i, file) in batch.iter().enumerate() {
        progress.file_start(i, file.path());
        let image = PageImage::load(file.path())?;
        assembler.push_image(&image)?;
        progress.file_complete(i, file.path());
    }

    let pages = assembler.page_count();
    info!("Writing {} page(s) to {}", pages, output.display());
    let bytes = assembler.finish()?;
    write_atomically(&output, &bytes)?;
    progress.finish(Some(&output));

    Ok(AssemblyReport {
        output: Some(output),
        pages,
    })
}
