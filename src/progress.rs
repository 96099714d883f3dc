//! Progress-callback trait for per-destination export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through each destination.
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a log sink, or a channel
//! without the library knowing how the host application communicates.
//! Destinations are processed strictly in order, so implementations never
//! see interleaved events, but the trait is still `Send + Sync` so an
//! `Arc` of it can cross task boundaries.

use std::sync::Arc;

/// Called by the export pipeline as it processes each destination.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once before the first capture.
    fn on_export_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a destination is captured.
    fn on_page_start(&self, index: usize, total: usize, url: &str) {
        let _ = (index, total, url);
    }

    /// Called when a destination has been captured and converted.
    ///
    /// `pdf_bytes` is the size of the staged document file.
    fn on_page_complete(&self, index: usize, total: usize, url: &str, pdf_bytes: u64) {
        let _ = (index, total, url, pdf_bytes);
    }

    /// Called once after the archive has been finalized.
    fn on_export_complete(&self, total: usize, archive_bytes: u64) {
        let _ = (total, archive_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        total_seen: AtomicUsize,
    }

    impl ExportProgressCallback for TrackingCallback {
        fn on_export_start(&self, total: usize) {
            self.total_seen.store(total, Ordering::SeqCst);
        }

        fn on_page_start(&self, _index: usize, _total: usize, _url: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _index: usize, _total: usize, _url: &str, _bytes: u64) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_export_start(3);
        cb.on_page_start(1, 3, "https://a.example.com");
        cb.on_page_complete(1, 3, "https://a.example.com", 1024);
        cb.on_export_complete(3, 4096);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            total_seen: AtomicUsize::new(0),
        };

        tracker.on_export_start(2);
        tracker.on_page_start(1, 2, "https://a");
        tracker.on_page_complete(1, 2, "https://a", 10);
        tracker.on_page_start(2, 2, "https://b");
        tracker.on_page_complete(2, 2, "https://b", 20);

        assert_eq!(tracker.total_seen.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ExportProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_export_start(10);
        cb.on_page_start(1, 10, "https://x");
    }
}
