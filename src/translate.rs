//! PDF translation entry points and the strategy selector.
//!
//! ## Flow
//!
//! 1. validate the upload (non-empty, `%PDF` magic)
//! 2. scan every page once on the blocking pool and summarise the structure
//! 3. run the preferred strategy; on failure run the other one exactly once
//! 4. return the first document produced, with per-unit warnings and stats
//!
//! A document is only returned when a strategy completes. Units the service
//! could not translate never fail the request; they are reported in
//! [`TranslationOutput::warnings`].

use crate::config::{StrategyPreference, TranslationConfig};
use crate::engine;
use crate::error::PaperworkError;
use crate::language::Language;
use crate::output::{StrategyKind, TranslationOutput, TranslationStats};
use crate::pipeline::analyze::analyze;
use crate::pipeline::conversion::DocumentConversion;
use crate::pipeline::extract::{open_document, scan_document};
use crate::pipeline::overlay::BlockOverlay;
use crate::pipeline::service::{GoogleTranslator, TranslationService};
use crate::pipeline::strategy::{StrategyOutput, TranslationJob, TranslationStrategy};
use crate::request::TranslationRequest;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Translate a PDF into `request.target`.
///
/// # Returns
/// `Ok(TranslationOutput)` when one of the two strategies produced a PDF,
/// even if some units were skipped (check `output.warnings`).
///
/// # Errors
/// - [`PaperworkError::MissingInput`] / [`PaperworkError::NotAPdf`] for a bad upload
/// - [`PaperworkError::CorruptPdf`] when pdfium cannot open the document
/// - [`PaperworkError::AllStrategiesFailed`] when both strategies aborted
pub async fn translate_pdf(
    request: &TranslationRequest,
    config: &TranslationConfig,
) -> Result<TranslationOutput, PaperworkError> {
    let start = Instant::now();
    request.validate()?;
    info!(
        "Translating '{}' ({} bytes) → {}",
        request.file_name,
        request.pdf.len(),
        request.target
    );

    let service = resolve_service(config)?;
    let pdf: Arc<[u8]> = Arc::from(request.pdf.as_slice());

    // ── Step 1: Scan and analyse ─────────────────────────────────────────
    let bytes = pdf.clone();
    let pages = engine::run_blocking("Analyze", move || {
        let pdfium = engine::bind()?;
        let document = open_document(&pdfium, &bytes)?;
        scan_document(&document)
    })
    .await?;

    let structure = analyze(&pages, &config.thresholds);
    info!(
        "Structure: {} pages, tables={}, images={}, complex={} ({} blocks max)",
        structure.page_count,
        structure.has_tables,
        structure.has_images,
        structure.complex_layout,
        structure.max_blocks_per_page
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(&structure);
    }

    // ── Step 2: Pick and run a strategy ──────────────────────────────────
    let first = match config.preference {
        StrategyPreference::Auto => structure.preferred_strategy(),
        StrategyPreference::Overlay => StrategyKind::Overlay,
        StrategyPreference::Conversion => StrategyKind::Conversion,
    };

    let job = TranslationJob {
        pdf,
        pages: pages.into(),
        target: request.target,
        service,
        config: config.clone(),
    };

    let (primary, fallback) = strategies(first);
    let (output, strategy, fallback_used) =
        run_with_fallback(primary.as_ref(), fallback.as_ref(), &job).await?;

    // ── Step 3: Report ───────────────────────────────────────────────────
    let warnings = output.warnings();
    let stats = TranslationStats {
        total_units: output.outcomes.len(),
        translated_units: output.outcomes.len() - warnings.len(),
        failed_units: warnings.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Translation complete via {}: {}/{} units, {} pages, {}ms",
        strategy,
        stats.translated_units,
        stats.total_units,
        output.document.page_count(),
        stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_translation_complete(strategy, stats.translated_units, stats.failed_units);
    }

    Ok(TranslationOutput {
        document: output.document,
        strategy,
        fallback_used,
        structure,
        warnings,
        stats,
    })
}

/// Synchronous wrapper around [`translate_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn translate_sync(
    request: &TranslationRequest,
    config: &TranslationConfig,
) -> Result<TranslationOutput, PaperworkError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PaperworkError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(translate_pdf(request, config))
}

/// Translate the PDF at `input` and write the result.
///
/// `output` defaults to `traduzido_<input file name>` next to the input.
/// Returns the translation report and the path written.
pub async fn translate_file(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    target: Language,
    config: &TranslationConfig,
) -> Result<(TranslationOutput, PathBuf), PaperworkError> {
    let input = input.as_ref();
    let bytes = tokio::fs::read(input)
        .await
        .map_err(|source| PaperworkError::InputReadFailed {
            path: input.to_path_buf(),
            source,
        })?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let request = TranslationRequest::new(name, bytes, target);

    let result = translate_pdf(&request, config).await?;

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(request.output_filename()),
    };
    result.document.write_to(&path)?;
    info!("Translated PDF written to {}", path.display());
    Ok((result, path))
}

/// The injected service, or a [`GoogleTranslator`] built from the config.
pub fn resolve_service(config: &TranslationConfig) -> Result<Arc<dyn TranslationService>, PaperworkError> {
    match config.service {
        Some(ref service) => Ok(Arc::clone(service)),
        None => Ok(Arc::new(GoogleTranslator::from_config(config)?)),
    }
}

fn strategies(first: StrategyKind) -> (Box<dyn TranslationStrategy>, Box<dyn TranslationStrategy>) {
    let make = |kind: StrategyKind| -> Box<dyn TranslationStrategy> {
        match kind {
            StrategyKind::Overlay => Box::new(BlockOverlay),
            StrategyKind::Conversion => Box::new(DocumentConversion),
        }
    };
    (make(first), make(first.other()))
}

/// Run `primary`; if it fails, run `fallback` once.
///
/// Returns the output, the strategy that produced it and whether the
/// fallback was needed.
async fn run_with_fallback(
    primary: &dyn TranslationStrategy,
    fallback: &dyn TranslationStrategy,
    job: &TranslationJob,
) -> Result<(StrategyOutput, StrategyKind, bool), PaperworkError> {
    let first_error = match attempt(primary, job).await {
        Ok(output) => return Ok((output, primary.kind(), false)),
        Err(e) => {
            warn!("{}; falling back to {}", e, fallback.kind());
            failure_detail(e)
        }
    };
    if let Some(ref cb) = job.config.progress_callback {
        cb.on_strategy_failed(primary.kind(), &first_error);
    }

    match attempt(fallback, job).await {
        Ok(output) => Ok((output, fallback.kind(), true)),
        Err(e) => {
            warn!("{}", e);
            let second_error = failure_detail(e);
            if let Some(ref cb) = job.config.progress_callback {
                cb.on_strategy_failed(fallback.kind(), &second_error);
            }
            Err(PaperworkError::AllStrategiesFailed {
                first: primary.kind(),
                first_error,
                second: fallback.kind(),
                second_error,
            })
        }
    }
}

/// Run one strategy, reporting any failure as [`PaperworkError::StrategyFailed`].
async fn attempt(
    strategy: &dyn TranslationStrategy,
    job: &TranslationJob,
) -> Result<StrategyOutput, PaperworkError> {
    strategy.run(job).await.map_err(|e| match e {
        e @ PaperworkError::StrategyFailed { .. } => e,
        other => PaperworkError::StrategyFailed {
            strategy: strategy.kind(),
            detail: other.to_string(),
        },
    })
}

fn failure_detail(e: PaperworkError) -> String {
    match e {
        PaperworkError::StrategyFailed { detail, .. } => detail,
        other => other.to_string(),
    }
}
