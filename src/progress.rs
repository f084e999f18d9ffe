//! Progress-callback trait for translation events.
//!
//! Inject an [`Arc<dyn TranslationProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events as the pipeline analyses the document, runs a strategy and
//! translates each unit.
//!
//! # Example
//!
//! ```rust
//! use paperwork::{TranslationProgressCallback, TranslationConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl TranslationProgressCallback for CountingCallback {
//!     fn on_unit_complete(&self, page: usize, unit: usize, total_units: usize) {
//!         let n = self.done.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{n}/{total_units} (page {page}, unit {unit})");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//!
//! let config = TranslationConfig::builder()
//!     .progress_callback(counter as Arc<dyn TranslationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{DocumentStructure, StrategyKind};
use std::sync::Arc;

/// Called by the translation pipeline as it works through a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Units are translated one at a time, but the callback
/// is shared behind an `Arc`, so implementations must be `Send + Sync`.
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once after the structure analyzer has scanned the source.
    fn on_analysis_complete(&self, structure: &DocumentStructure) {
        let _ = structure;
    }

    /// Called when a strategy starts, with the number of units it will translate.
    fn on_strategy_start(&self, strategy: StrategyKind, total_units: usize) {
        let _ = (strategy, total_units);
    }

    /// Called after a unit was translated.
    ///
    /// # Arguments
    /// * `page`        — 1-indexed page number
    /// * `unit`        — 1-indexed unit number within the strategy run
    /// * `total_units` — units in this strategy run
    fn on_unit_complete(&self, page: usize, unit: usize, total_units: usize) {
        let _ = (page, unit, total_units);
    }

    /// Called when a unit could not be translated and was skipped.
    fn on_unit_error(&self, page: usize, unit: usize, total_units: usize, error: &str) {
        let _ = (page, unit, total_units, error);
    }

    /// Called when a whole strategy aborted, before any fallback.
    fn on_strategy_failed(&self, strategy: StrategyKind, error: &str) {
        let _ = (strategy, error);
    }

    /// Called once when a strategy produced the final document.
    fn on_translation_complete(&self, strategy: StrategyKind, translated: usize, failed: usize) {
        let _ = (strategy, translated, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;
