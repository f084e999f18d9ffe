//! Document-conversion strategy.
//!
//! ```text
//! page scans ──▶ StructuredDocument ──▶ translate ──▶ JSON in TempDir ──▶ reload ──▶ reflow ──▶ PDF
//! ```
//!
//! The intermediate lives in a request-scoped [`tempfile::TempDir`] that is
//! removed when the run ends, successful or not. Reflowing loses the source
//! fonts, images and exact positions but never overlaps text, which makes it
//! the better choice for tables and dense layouts.

use super::sheet::render_sheets;
use super::strategy::{translate_units, StrategyOutput, TranslationJob, TranslationStrategy};
use super::structured::StructuredDocument;
use crate::engine;
use crate::error::PaperworkError;
use crate::output::{RenderedDocument, StrategyKind};
use async_trait::async_trait;
use tempfile::TempDir;
use tracing::{debug, info};

const INTERMEDIATE_FILE: &str = "translated.json";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentConversion;

#[async_trait]
impl TranslationStrategy for DocumentConversion {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Conversion
    }

    async fn run(&self, job: &TranslationJob) -> Result<StrategyOutput, PaperworkError> {
        let mut document = StructuredDocument::from_scans(&job.pages);
        let slots = document.translatable();
        info!(
            "Document conversion: {} pages, {} paragraphs/cells",
            document.pages.len(),
            slots.len()
        );

        let (slots, units): (Vec<_>, Vec<_>) = slots.into_iter().unzip();
        let outcomes = translate_units(StrategyKind::Conversion, units, job).await;
        for (slot, outcome) in slots.into_iter().zip(&outcomes) {
            if let Ok(text) = &outcome.result {
                document.set_text(slot, text.clone());
            }
        }

        let workdir = TempDir::new().map_err(|e| PaperworkError::Internal(format!("cannot create temp dir: {e}")))?;
        let font_size = job.config.reflow_font_size;

        let (bytes, page_count) = engine::run_blocking("Conversion", move || {
            let path = workdir.path().join(INTERMEDIATE_FILE);
            document.save_json(&path)?;
            let reloaded = StructuredDocument::load_json(&path)?;
            debug!("Intermediate document round-tripped through {}", path.display());

            let sheets = reloaded.reflow(font_size);
            let pdfium = engine::bind()?;
            let bytes = render_sheets(&pdfium, &sheets, &[])?;
            Ok((bytes, sheets.len()))
        })
        .await?;

        Ok(StrategyOutput {
            document: RenderedDocument::new(bytes, page_count),
            outcomes,
        })
    }
}
