//! Pipeline stages for batch media operations.
//!
//! Each submodule implements exactly one transformation step. Stages run
//! sequentially on the calling thread; batch order is significant for page
//! order and stitch offsets.
//!
//! ## Data Flow
//!
//! ```text
//!                     ┌─▶ raster   (decode → re-encode, one file per input)
//! input ─▶ FileBatch ─┼─▶ page + assemble ─▶ sink   (images → PDF)
//! (dir + ext)         ├─▶ merge    ─▶ sink          (PDFs → PDF)
//!                     └─▶ stitch   ─▶ sink          (images → one image)
//!
//! digest  (two paths → DigestPair)
//! extract (PDF → embedded images)
//! ```
//!
//! 1. [`input`]   : list a directory, filter by extension, sort by name
//! 2. [`digest`]  : SHA-256 of two files, uppercase hex
//! 3. [`raster`]  : decode/encode helpers and batch format conversion
//! 4. [`page`]    : one image → one PDF page, native or scale-to-fit
//! 5. [`assemble`]: drive [`page`] over a batch into one document
//! 6. [`merge`]   : concatenate existing PDFs
//! 7. [`stitch`]  : vertical composite canvas
//! 8. [`extract`] : pull image XObjects out of a PDF
//! 9. [`sink`]    : atomic output writes shared by every stage

pub mod assemble;
pub mod digest;
pub mod extract;
pub mod input;
pub mod merge;
pub mod page;
pub mod raster;
pub mod sink;
pub mod stitch;
