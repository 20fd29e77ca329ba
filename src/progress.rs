//! Progress-callback trait for per-page generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events while the document is being drawn.
//!
//! Pages are rendered one at a time on the calling thread, so events arrive
//! strictly in page order: `on_page_start(n)` is always followed by
//! `on_page_complete(n)` before page `n + 1` begins, and every page completes
//! exactly once. A failing card aborts the run without a completion event
//! for its page.
//!
//! # Example
//!
//! ```rust
//! use qrcards::{GenerationConfig, GenerationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, cards: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} cards)", page_num, total_pages, cards);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: AtomicUsize::new(0),
//! });
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the generator as it draws each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The trait is `Send + Sync` so a config holding a
/// callback can be shared across threads, even though generation itself
/// never runs pages concurrently.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once after layout, before any page is drawn.
    ///
    /// # Arguments
    /// * `total_pages`: number of pages the document will have
    /// * `total_cards`: number of eligible rows being laid out
    fn on_generation_start(&self, total_pages: usize, total_cards: usize) {
        let _ = (total_pages, total_cards);
    }

    /// Called just before the first card of a page is drawn.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when every card of a page has been drawn.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages
    /// * `cards`: number of cards on this page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, cards: usize) {
        let _ = (page_num, total_pages, cards);
    }

    /// Called once after the document bytes have been produced.
    ///
    /// # Arguments
    /// * `total_pages`: pages in the finished document
    /// * `bytes`: size of the encoded document
    fn on_generation_complete(&self, total_pages: usize, bytes: usize) {
        let _ = (total_pages, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl GenerationProgressCallback for RecordingCallback {
        fn on_generation_start(&self, total_pages: usize, total_cards: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {total_pages} {total_cards}"));
        }

        fn on_page_complete(&self, page_num: usize, total_pages: usize, cards: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page {page_num}/{total_pages} {cards}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_generation_start(5, 90);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 21);
        cb.on_generation_complete(5, 4096);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let cb = RecordingCallback::default();
        cb.on_generation_start(2, 30);
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 21);
        cb.on_page_complete(2, 2, 9);
        assert_eq!(
            *cb.events.lock().unwrap(),
            vec!["start 2 30", "page 1/2 21", "page 2/2 9"]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_generation_start(10, 200);
        cb.on_page_start(1, 10);
        cb.on_page_complete(1, 10, 21);
    }
}
