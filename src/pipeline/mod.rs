//! Pipeline stages for quote composition and PDF translation.
//!
//! Each submodule implements one step. Layout stages are pure and produce
//! [`sheet::Sheet`]s; only [`sheet`], [`extract`], [`overlay`] and
//! [`conversion`] call pdfium, and always inside `spawn_blocking`.
//!
//! ## Quote composition
//!
//! ```text
//! image ──▶ quote ──▶ sheet
//! (decode)  (layout)  (pdfium)
//! ```
//!
//! ## Translation
//!
//! ```text
//! extract ──▶ analyze ──▶ overlay ────┐
//! (pdfium)    (heuristic) conversion ─┴─▶ service (HTTP)
//! ```
//!
//! 1. [`extract`]  — group pdfium text segments into blocks per page
//! 2. [`analyze`]  — decide whether the document looks tabular or dense
//! 3. [`overlay`] / [`conversion`] — the two [`strategy::TranslationStrategy`]
//!    implementations
//! 4. [`service`]  — the translation endpoint; the only network I/O
//!
//! [`metrics`] and [`wrap`] are shared text-measuring helpers.

pub mod analyze;
pub mod conversion;
pub mod extract;
pub mod image;
pub mod metrics;
pub mod overlay;
pub mod quote;
pub mod service;
pub mod sheet;
pub mod strategy;
pub mod structured;
pub mod wrap;
