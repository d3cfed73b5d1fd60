//! Document merging: concatenate the pages of several PDFs, in batch order.
//!
//! Each source is loaded fully, its object ids are shifted past everything
//! already in the destination, and its pages are re-parented under the
//! destination's single `Pages` node. Source catalogs, page-tree nodes and
//! outlines are dropped; every other object is carried over unchanged.
//!
//! Pages can inherit `MediaBox`, `CropBox`, `Resources` and `Rotate` from
//! their ancestors. Those ancestors are dropped, so the inherited values are
//! copied onto each page first.

use crate::config::BatchConfig;
use crate::error::MediaBeltError;
use crate::output::AssemblyReport;
use crate::pipeline::assemble::PageTree;
use crate::pipeline::input::FileBatch;
use crate::pipeline::sink::{output_path_or, write_atomically, DEFAULT_PDF_OUTPUT};
use crate::progress::Progress;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info};

const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guards against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Dictionary types that belong to a source's document structure.
const STRUCTURAL_TYPES: [&[u8]; 4] = [b"Catalog", b"Pages", b"Outlines", b"Outline"];

/// Load a PDF from disk, distinguishing unreadable files from corrupt ones.
pub fn load_pdf(path: &Path) -> Result<Document, MediaBeltError> {
    let bytes = std::fs::read(path).map_err(|e| MediaBeltError::from_read(path, e))?;
    Document::load_mem(&bytes).map_err(|e| MediaBeltError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Copy attributes a page inherits from its ancestors onto the page itself.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> lopdf::Result<()> {
    let page = doc.get_object(page_id)?.as_dict()?;
    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|k| !page.has(k))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    let mut inherited: Vec<(Vec<u8>, Object)> = Vec::new();
    let mut depth = 0;
    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        depth += 1;
        let node = doc.get_object(node_id)?.as_dict()?;
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    if !inherited.is_empty() {
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
    Ok(())
}

fn is_structural(obj: &Object) -> bool {
    match obj {
        Object::Dictionary(d) => d
            .get(b"Type")
            .and_then(Object::as_name)
            .map(|t| STRUCTURAL_TYPES.contains(&t))
            .unwrap_or(false),
        _ => false,
    }
}

/// Concatenates documents page by page into one destination.
pub struct DocumentMerger {
    tree: PageTree,
}

impl Default for DocumentMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentMerger {
    pub fn new() -> Self {
        Self {
            tree: PageTree::new(),
        }
    }

    /// Append every page of `source`, in its own page order.
    ///
    /// Returns the number of pages appended.
    pub fn append(&mut self, mut source: Document) -> Result<usize, MediaBeltError> {
        source.renumber_objects_with(self.tree.doc.max_id + 1);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        for &page_id in &page_ids {
            flatten_inherited(&mut source, page_id)?;
        }

        let mut objects = std::mem::take(&mut source.objects);
        for &page_id in &page_ids {
            if let Some(Object::Dictionary(page)) = objects.get_mut(&page_id) {
                page.set("Parent", self.tree.pages_id);
            }
        }
        objects.retain(|_, obj| !is_structural(obj));

        let max_id = objects
            .keys()
            .map(|(id, _)| *id)
            .max()
            .unwrap_or(0)
            .max(self.tree.doc.max_id);
        self.tree.doc.max_id = max_id;
        self.tree.doc.objects.extend(objects);

        for &page_id in &page_ids {
            self.tree.push(page_id);
        }
        debug!("Appended {} page(s)", page_ids.len());
        Ok(page_ids.len())
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.tree.len()
    }

    /// Serialise the merged document.
    pub fn finish(self) -> Result<Vec<u8>, MediaBeltError> {
        self.tree.into_bytes()
    }
}

/// Merge every PDF in `batch` into one written to `output_name`
/// (`output.pdf` when empty).
///
/// An empty batch writes nothing. A source that cannot be read or parsed
/// aborts the merge before anything is written.
pub fn merge_pdfs(
    batch: &FileBatch,
    output_name: &str,
    config: &BatchConfig,
) -> Result<AssemblyReport, MediaBeltError> {
    if batch.is_empty() {
        info!("No documents to merge");
        return Ok(AssemblyReport::default());
    }
    let output = output_path_or(output_name, DEFAULT_PDF_OUTPUT);

    let progress = Progress::new(config.progress_callback.as_ref(), batch.len());
    let mut merger = DocumentMerger::new();
    for (i, file) in batch.iter().enumerate() {
        progress.file_start(i, file.path());
        let source = load_pdf(file.path())?;
        merger.append(source)?;
        progress.file_complete(i, file.path());
    }

    let pages = merger.page_count();
    info!("Writing {} merged page(s) to {}", pages, output.display());
    let bytes = merger.finish()?;
    write_atomically(&output, &bytes)?;
    progress.finish(Some(&output));

    Ok(AssemblyReport {
        output: Some(output),
        pages,
    })
}
