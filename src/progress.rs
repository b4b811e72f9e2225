//! Progress-callback trait for batch normalization events.
//!
//! Inject an [`Arc<dyn NormalizeProgressCallback>`] via
//! [`crate::config::NormalizerConfigBuilder::progress_callback`] to receive
//! events as [`crate::normalize::normalize_all`] or
//! [`crate::stream::normalize_stream`] work through their inputs.
//!
//! # Example
//!
//! ```rust
//! use imgnorm::{NormalizeProgressCallback, Normalized, NormalizerConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FallbackCounter {
//!     fallbacks: AtomicUsize,
//! }
//!
//! impl NormalizeProgressCallback for FallbackCounter {
//!     fn on_file_complete(&self, result: &Normalized) {
//!         if result.outcome.is_fallback() {
//!             self.fallbacks.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let counter = Arc::new(FallbackCounter { fallbacks: AtomicUsize::new(0) });
//!
//! let config = NormalizerConfig::builder()
//!     .progress_callback(counter as Arc<dyn NormalizeProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{BatchStats, Normalized};
use std::sync::Arc;

/// Called by the batch APIs as they process each file.
///
/// Files are normalized concurrently, so `on_file_start` and
/// `on_file_complete` may be called from different tasks at once.
/// All methods default to no-ops.
pub trait NormalizeProgressCallback: Send + Sync {
    /// Called once before any file is processed.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a file enters the normalizer.
    ///
    /// # Arguments
    /// * `index` — 0-based position of the file in the input list
    /// * `name`  — the file's display name
    fn on_file_start(&self, index: usize, name: &str) {
        let _ = (index, name);
    }

    /// Called when a file leaves the normalizer, whatever the outcome.
    fn on_file_complete(&self, result: &Normalized) {
        let _ = result;
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, stats: &BatchStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl NormalizeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::NormalizerConfig`].
pub type ProgressCallback = Arc<dyn NormalizeProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::ImageFile;
    use crate::output::NormalizeOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        batch_total: AtomicUsize,
    }

    impl NormalizeProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.batch_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _result: &Normalized) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn passthrough(index: usize) -> Normalized {
        let file = ImageFile::new("a.png", "image/png", vec![0; 8]);
        Normalized {
            index,
            original_bytes: file.len(),
            file,
            outcome: NormalizeOutcome::Passthrough,
            duration_ms: 0,
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(0, "a.png");
        cb.on_file_complete(&passthrough(0));
        cb.on_batch_complete(&BatchStats::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(2);
        tracker.on_file_start(0, "a.png");
        tracker.on_file_complete(&passthrough(0));
        tracker.on_file_start(1, "b.png");

        assert_eq!(tracker.batch_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_file_start(3, "x.jpg");
    }
}
