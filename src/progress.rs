//! Progress-callback trait for per-image dispatch events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline hands each page image to the renderer.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2img::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_image_complete(&self, page_index: usize, total_images: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} rendered", page_index + 1, total_images);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline while it dispatches page images.
///
/// Dispatch is sequential, so calls never overlap for one conversion, but a
/// single callback may be shared by several conversions and must be
/// `Send + Sync`. All methods have default no-op implementations.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the sorted image list is known, before any dispatch.
    fn on_conversion_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called just before the renderer receives an image.
    ///
    /// `page_index` is the 0-based index parsed from the file name.
    fn on_image_start(&self, page_index: usize, total_images: usize) {
        let _ = (page_index, total_images);
    }

    /// Called when the renderer returned successfully for an image.
    fn on_image_complete(&self, page_index: usize, total_images: usize) {
        let _ = (page_index, total_images);
    }

    /// Called when the renderer failed. Dispatch stops after this event.
    fn on_image_error(&self, page_index: usize, total_images: usize, error: &str) {
        let _ = (page_index, total_images, error);
    }

    /// Called once after the last image has been dispatched.
    fn on_conversion_complete(&self, total_images: usize, dispatched: usize) {
        let _ = (total_images, dispatched);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        started_total: AtomicUsize,
        dispatched_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_images: usize) {
            self.started_total.store(total_images, Ordering::SeqCst);
        }

        fn on_image_start(&self, _page_index: usize, _total_images: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_complete(&self, _page_index: usize, _total_images: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_image_error(&self, _page_index: usize, _total_images: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total_images: usize, dispatched: usize) {
            self.dispatched_total.store(dispatched, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_image_start(0, 5);
        cb.on_image_complete(0, 5);
        cb.on_image_error(1, 5, "renderer crashed");
        cb.on_conversion_complete(5, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_conversion_start(3);
        for page in 0..2 {
            tracker.on_image_start(page, 3);
            tracker.on_image_complete(page, 3);
        }
        tracker.on_image_start(2, 3);
        tracker.on_image_error(2, 3, "exit status 2");
        tracker.on_conversion_complete(3, 2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.dispatched_total.load(Ordering::SeqCst), 2);
    }
}
