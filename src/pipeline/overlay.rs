//! Block-overlay strategy: keep every page as it is and paint translations
//! over the original text blocks.
//!
//! Three phases:
//!
//! 1. units are taken from the page scans the analyzer already made;
//! 2. units are translated one by one (async, no pdfium);
//! 3. on the blocking pool the source is reloaded and, for every translated
//!    block, an opaque white rectangle is painted over the block and the
//!    translation drawn from its top-left corner, one line per `\n`. Lines are
//!    not re-wrapped; text may run past the block.
//!
//! Everything else on the page (images, vector art, untranslated blocks)
//! stays untouched.

use super::extract::{open_document, PageScan};
use super::metrics::FontFace;
use super::sheet::{paint_marks, FontSet, Mark, Rgb};
use super::strategy::{translate_units, StrategyOutput, TranslationJob, TranslationStrategy};
use crate::config::FailedBlockPolicy;
use crate::engine;
use crate::error::PaperworkError;
use crate::output::{RenderedDocument, StrategyKind, TranslationUnit, UnitOutcome};
use async_trait::async_trait;
use tracing::{debug, info};

/// Baseline distance as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

#[derive(Debug, Default, Clone, Copy)]
pub struct BlockOverlay;

#[async_trait]
impl TranslationStrategy for BlockOverlay {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Overlay
    }

    async fn run(&self, job: &TranslationJob) -> Result<StrategyOutput, PaperworkError> {
        let units = units_from_pages(&job.pages);
        info!("Block overlay: {} blocks on {} pages", units.len(), job.pages.len());

        let outcomes = translate_units(StrategyKind::Overlay, units, job).await;

        let pdf = job.pdf.clone();
        let font_size = job.config.font_size;
        let policy = job.config.failed_blocks;
        let page_count = job.pages.len();
        let painted = outcomes.clone();

        let bytes = engine::run_blocking("Overlay", move || {
            let pdfium = engine::bind()?;
            let mut document = open_document(&pdfium, &pdf)?;
            let fonts = FontSet::load(&mut document);

            for (idx, mut page) in document.pages().iter().enumerate() {
                let page_num = idx + 1;
                let on_page: Vec<&UnitOutcome> =
                    painted.iter().filter(|o| o.unit.page == page_num).collect();
                let marks = overlay_marks(&on_page, font_size, policy);
                paint_marks(&mut page, &marks, &fonts, &[], page_num)?;
                debug!("Overlay page {}: {} marks", page_num, marks.len());
            }

            document.save_to_bytes().map_err(|e| PaperworkError::RenderFailed {
                page: 0,
                detail: format!("save failed: {:?}", e),
            })
        })
        .await?;

        Ok(StrategyOutput {
            document: RenderedDocument::new(bytes, page_count),
            outcomes,
        })
    }
}

/// One unit per block, numbered across the document in reading order.
pub fn units_from_pages(pages: &[PageScan]) -> Vec<TranslationUnit> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(p, scan)| scan.blocks.iter().map(move |b| (p + 1, b)))
        .enumerate()
        .map(|(i, (page, block))| TranslationUnit {
            page,
            index: i + 1,
            rect: block.rect,
            text: block.text.clone(),
        })
        .collect()
}

/// Marks for the blocks of one page.
pub fn overlay_marks(outcomes: &[&UnitOutcome], font_size: f32, policy: FailedBlockPolicy) -> Vec<Mark> {
    let mut marks = Vec::new();
    for outcome in outcomes {
        let rect = outcome.unit.rect;
        match &outcome.result {
            Ok(translated) => {
                marks.push(Mark::Rect {
                    rect,
                    fill: Some(Rgb::WHITE),
                    stroke: None,
                });
                let first_baseline = rect.top - font_size;
                for (i, line) in translated.split('\n').enumerate() {
                    marks.push(Mark::text(
                        rect.left,
                        first_baseline - i as f32 * font_size * LINE_HEIGHT_FACTOR,
                        line,
                        FontFace::Regular,
                        font_size,
                    ));
                }
            }
            Err(_) if policy == FailedBlockPolicy::Blank => marks.push(Mark::Rect {
                rect,
                fill: Some(Rgb::WHITE),
                stroke: None,
            }),
            Err(_) => {}
        }
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;
    use crate::output::BlockRect;
    use crate::pipeline::extract::TextBlock;

    fn scan(texts: &[&str]) -> PageScan {
        PageScan {
            width: 595.0,
            height: 842.0,
            blocks: texts
                .iter()
                .enumerate()
                .map(|(i, t)| TextBlock {
                    rect: BlockRect::new(50.0, 700.0 - i as f32 * 50.0, 300.0, 730.0 - i as f32 * 50.0),
                    text: t.to_string(),
                })
                .collect(),
            image_count: 0,
        }
    }

    fn outcome(text: &str, result: Result<&str, ()>) -> UnitOutcome {
        let unit = TranslationUnit {
            page: 1,
            index: 1,
            rect: BlockRect::new(50.0, 700.0, 300.0, 730.0),
            text: text.into(),
        };
        UnitOutcome {
            result: result.map(str::to_string).map_err(|_| UnitError::TranslationFailed {
                page: 1,
                unit: 1,
                detail: "HTTP 503".into(),
            }),
            unit,
        }
    }

    #[test]
    fn units_are_numbered_across_pages() {
        let pages = vec![scan(&["a", "b"]), scan(&[]), scan(&["c"])];
        let units = units_from_pages(&pages);
        let summary: Vec<(usize, usize, &str)> =
            units.iter().map(|u| (u.page, u.index, u.text.as_str())).collect();
        assert_eq!(summary, vec![(1, 1, "a"), (1, 2, "b"), (3, 3, "c")]);
    }

    #[test]
    fn translated_block_is_covered_then_written() {
        let o = outcome("Olá\nmundo", Ok("Hello\nworld"));
        let marks = overlay_marks(&[&o], 10.0, FailedBlockPolicy::KeepOriginal);
        assert_eq!(marks.len(), 3);
        assert!(matches!(marks[0], Mark::Rect { fill: Some(Rgb::WHITE), .. }));
        match (&marks[1], &marks[2]) {
            (
                Mark::Text { x, baseline: b1, text: t1, size, .. },
                Mark::Text { baseline: b2, text: t2, .. },
            ) => {
                assert_eq!(*x, 50.0);
                assert_eq!(*size, 10.0);
                assert_eq!(*b1, 720.0);
                assert!((b1 - b2 - 12.0).abs() < 1e-4);
                assert_eq!((t1.as_str(), t2.as_str()), ("Hello", "world"));
            }
            other => panic!("unexpected marks {other:?}"),
        }
    }

    #[test]
    fn failed_block_kept_by_default() {
        let o = outcome("Olá", Err(()));
        assert!(overlay_marks(&[&o], 10.0, FailedBlockPolicy::KeepOriginal).is_empty());
    }

    #[test]
    fn failed_block_blanked_on_request() {
        let o = outcome("Olá", Err(()));
        let marks = overlay_marks(&[&o], 10.0, FailedBlockPolicy::Blank);
        assert_eq!(marks.len(), 1);
        assert!(matches!(marks[0], Mark::Rect { .. }));
    }

    #[test]
    fn font_size_is_configurable() {
        let o = outcome("Olá", Ok("Hello"));
        let marks = overlay_marks(&[&o], 8.0, FailedBlockPolicy::KeepOriginal);
        assert!(matches!(marks[1], Mark::Text { size, baseline, .. } if size == 8.0 && baseline == 722.0));
    }
}
