//! # paperwork
//!
//! Two small document services built on pdfium:
//!
//! * **Quote composer**: turn a filled-in demolition quote form (client data,
//!   value, optional logo and banner) into a one-page A4 PDF with agreement
//!   clauses and signature lines.
//! * **PDF translator**: translate every text block of an uploaded PDF into
//!   one of six languages, either by painting translations over the original
//!   blocks or by reflowing the document as paragraphs and tables, with an
//!   automatic fallback from one to the other.
//!
//! ## Pipeline Overview
//!
//! ```text
//! QuoteRequest ─▶ decode images ─▶ layout ─▶ pdfium ─▶ RenderedDocument
//!
//! TranslationRequest
//!  │
//!  ├─ 1. Scan     group pdfium text segments into blocks (spawn_blocking)
//!  ├─ 2. Analyse  tables? dense layout? images?
//!  ├─ 3. Strategy block overlay  ─┐  one fallback to the other strategy
//!  │              conversion     ─┘  on failure
//!  └─ 4. Output   PDF + per-unit warnings + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paperwork::{compose_quote_async, translate_pdf, Language, QuoteRequest, QuoteTemplate,
//!     TranslationConfig, TranslationRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let quote = QuoteRequest {
//!         client_name: "Ana Souza".into(),
//!         agreed_value: 1234.5,
//!         ..Default::default()
//!     };
//!     let pdf = compose_quote_async(&quote, &QuoteTemplate::default()).await?;
//!     pdf.write_to(std::path::Path::new(&quote.output_filename()))?;
//!
//!     let bytes = std::fs::read("contrato.pdf")?;
//!     let request = TranslationRequest::new("contrato.pdf", bytes, Language::English);
//!     let output = translate_pdf(&request, &TranslationConfig::default()).await?;
//!     eprintln!("{} via {}, {} warnings",
//!         request.output_filename(), output.strategy, output.warnings.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `quote2pdf` and `pdftranslate` binaries (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## pdfium
//!
//! The native library is bound at runtime; see [`engine`] for the lookup
//! order and the `PDFIUM_LIB_PATH` override.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod request;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compose::{compose_quote, compose_quote_async, compose_quote_to_dir};
pub use config::{
    AnalyzerThresholds, FailedBlockPolicy, OverflowPolicy, QuoteTemplate, StrategyPreference,
    TranslationConfig, TranslationConfigBuilder, DEFAULT_TRANSLATE_ENDPOINT,
};
pub use error::{PaperworkError, ServiceError, UnitError};
pub use language::{Language, UnknownLanguage};
pub use output::{
    DocumentStructure, RenderedDocument, StrategyKind, TranslationOutput, TranslationStats,
    TranslationSummary,
};
pub use pipeline::service::{GoogleTranslator, TranslationService};
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use request::{clean_filename, QuoteRequest, TranslationRequest};
pub use translate::{translate_file, translate_pdf, translate_sync};
