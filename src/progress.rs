//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as an operation works through its batch.
//!
//! Batches are processed strictly in order on the calling thread, so events
//! arrive in batch order: `on_batch_start`, then a `on_file_start` /
//! `on_file_complete` pair per file, then `on_batch_complete`. When a file
//! fails the operation returns its error straight after `on_file_start` and
//! `on_batch_complete` is not called.
//!
//! # Example
//!
//! ```rust
//! use mediabelt::{BatchConfig, BatchProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl BatchProgressCallback for Counter {
//!     fn on_file_complete(&self, _index: usize, _total: usize, _path: &Path) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by batch operations as they process each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first file is read.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a file is read.
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called once a file has been fully consumed.
    fn on_file_complete(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called once after every file succeeded.
    ///
    /// `output` is the artifact written, if the operation writes a single one.
    fn on_batch_complete(&self, total: usize, output: Option<&Path>) {
        let _ = (total, output);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

/// Thin wrapper so pipeline stages don't repeat `if let Some(cb)` everywhere.
pub(crate) struct Progress<'a> {
    cb: Option<&'a ProgressCallback>,
    total: usize,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(cb: Option<&'a ProgressCallback>, total: usize) -> Self {
        if let Some(cb) = cb {
            cb.on_batch_start(total);
        }
        Self { cb, total }
    }

    pub(crate) fn file_start(&self, index: usize, path: &Path) {
        if let Some(cb) = self.cb {
            cb.on_file_start(index + 1, self.total, path);
        }
    }

    pub(crate) fn file_complete(&self, index: usize, path: &Path) {
        if let Some(cb) = self.cb {
            cb.on_file_complete(index + 1, self.total, path);
        }
    }

    pub(crate) fn finish(&self, output: Option<&Path>) {
        if let Some(cb) = self.cb {
            cb.on_batch_complete(self.total, output);
        }
    }
}
