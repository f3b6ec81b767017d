//! Progress-callback trait for per-page decode events.
//!
//! Inject an [`Arc<dyn DecodeProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through a document's pages.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a log file, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so it survives the trip through
//! `spawn_blocking`.
//!
//! # Example
//!
//! ```rust
//! use dmbatch::{BatchConfig, DecodeProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl DecodeProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page: usize, total_pages: usize, payloads: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} payloads)", page, total_pages, payloads);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn DecodeProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the decode pipeline as it processes each page.
///
/// Pages are processed strictly sequentially, so events for page N+1 never
/// arrive before page N has completed. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait DecodeProgressCallback: Send + Sync {
    /// Called once after the document is opened, before any page is decoded.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be processed
    fn on_decode_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is enhanced and handed to the detector.
    fn on_page_start(&self, page: usize, total_pages: usize) {
        let _ = (page, total_pages);
    }

    /// Called when a page yielded at least one payload.
    ///
    /// # Arguments
    /// * `page`        — 1-indexed page number
    /// * `total_pages` — pages selected for this run
    /// * `payloads`    — payloads recovered from this page
    fn on_page_complete(&self, page: usize, total_pages: usize, payloads: usize) {
        let _ = (page, total_pages, payloads);
    }

    /// Called when a page produced a warning (no symbol, render or decoder
    /// failure). The run continues with the next page.
    fn on_page_warning(&self, page: usize, total_pages: usize, warning: &str) {
        let _ = (page, total_pages, warning);
    }

    /// Called once after all pages have been attempted.
    ///
    /// # Arguments
    /// * `total_pages`    — pages selected for this run
    /// * `total_payloads` — payloads recovered across all pages
    fn on_decode_complete(&self, total_pages: usize, total_payloads: usize) {
        let _ = (total_pages, total_payloads);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl DecodeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn DecodeProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: Arc<AtomicUsize>,
        completes: Arc<AtomicUsize>,
        warnings: Arc<AtomicUsize>,
        recovered: Arc<AtomicUsize>,
    }

    impl DecodeProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page: usize, _total_pages: usize, _payloads: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_warning(&self, _page: usize, _total_pages: usize, _warning: &str) {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }

        fn on_decode_complete(&self, _total_pages: usize, total_payloads: usize) {
            self.recovered.store(total_payloads, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_decode_start(5);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 2);
        cb.on_page_warning(2, 5, "no symbol");
        cb.on_decode_complete(5, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: Arc::new(AtomicUsize::new(0)),
            completes: Arc::new(AtomicUsize::new(0)),
            warnings: Arc::new(AtomicUsize::new(0)),
            recovered: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_decode_start(3);
        tracker.on_page_start(1, 3);
        tracker.on_page_complete(1, 3, 2);
        tracker.on_page_start(2, 3);
        tracker.on_page_warning(2, 3, "Page 2: no DataMatrix symbol recovered");
        tracker.on_page_start(3, 3);
        tracker.on_page_complete(3, 3, 1);
        tracker.on_decode_complete(3, 3);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.warnings.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.recovered.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn DecodeProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_decode_start(10);
        cb.on_page_start(1, 10);
        cb.on_page_complete(1, 10, 1);
    }
}
