//! Error types for the paperwork library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`PaperworkError`] — **Fatal**: the request cannot produce a document
//!   (missing input, undecodable image, corrupt PDF, every translation
//!   strategy failed). Returned as `Err(PaperworkError)` from the public
//!   `compose*` and `translate*` functions.
//!
//! * [`UnitError`] — **Non-fatal**: one text block, paragraph or table cell
//!   could not be translated. The unit is skipped and the error is carried in
//!   [`crate::output::TranslationOutput::warnings`] so a caller can report
//!   every warning at once.
//!
//! * [`ServiceError`] — a single call to the translation service failed.
//!   Strategies turn it into a [`UnitError`]; it never escapes on its own.

use crate::output::StrategyKind;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the paperwork library.
#[derive(Debug, Error)]
pub enum PaperworkError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// A required field was empty before any processing began.
    #[error("Missing required input: {field}")]
    MissingInput { field: &'static str },

    /// The uploaded buffer is not a PDF.
    #[error("Input '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    // ── Document errors ───────────────────────────────────────────────────
    /// pdfium could not parse the source document.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// An uploaded image could not be decoded or re-encoded.
    #[error("Failed to decode {slot} image: {source}")]
    ImageDecode {
        slot: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// pdfium rejected a drawing or save operation.
    #[error("Rendering failed on page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The intermediate structured document could not be written or read.
    #[error("Intermediate document error at '{path}': {detail}")]
    IntermediateDocument { path: PathBuf, detail: String },

    // ── Translation pipeline errors ───────────────────────────────────────
    /// One strategy aborted. The selector may still fall back.
    #[error("{strategy} strategy failed: {detail}")]
    StrategyFailed { strategy: StrategyKind, detail: String },

    /// Both strategies failed; no partial output is delivered.
    #[error("All translation methods failed.\n{first}: {first_error}\n{second}: {second_error}")]
    AllStrategiesFailed {
        first: StrategyKind,
        first_error: String,
        second: StrategyKind,
        second_error: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an input file.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Place libpdfium next to the executable's working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single translation unit.
///
/// The overall translation continues; the unit keeps its original text.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum UnitError {
    /// The translation service failed for this unit.
    #[error("Page {page}, unit {unit}: translation failed: {detail}")]
    TranslationFailed {
        page: usize,
        unit: usize,
        detail: String,
    },
}

impl UnitError {
    /// 1-indexed page the failed unit belongs to.
    pub fn page(&self) -> usize {
        match self {
            UnitError::TranslationFailed { page, .. } => *page,
        }
    }
}

/// Failure of one request to the translation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response (DNS, TLS, connection, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}")]
    Status { status: u16 },

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The text exceeds the per-request character limit.
    #[error("text has {len} characters, limit is {limit}")]
    InputTooLong { len: usize, limit: usize },
}
