//! Text-block extraction from a source PDF.
//!
//! pdfium reports text as segments: runs of characters sharing a baseline and
//! style. Translation works on larger units, so segments are grouped twice:
//!
//! 1. segments whose vertical centres fall inside each other's extent form a
//!    band, which is cut into **lines** wherever the horizontal gap is wider
//!    than a column gutter (ordered left to right, joined by a space across a
//!    visible gap);
//! 2. a line directly below another (gap at most 0.8 × line height) whose
//!    horizontal range overlaps that block's joins it as a **block** (lines
//!    joined by `\n`). Side-by-side columns therefore stay separate blocks.
//!
//! Whitespace-only blocks are dropped. The grouping is pure and tested without
//! pdfium; [`scan_document`] is the only pdfium-facing function.

use crate::error::PaperworkError;
use crate::output::BlockRect;
use pdfium_render::prelude::*;
use tracing::debug;

/// Maximum vertical gap between two lines of one block, as a share of the
/// upper line's height.
const BLOCK_GAP_RATIO: f32 = 0.8;

/// Horizontal gap, as a share of line height, above which two segments on
/// one line are separated by a space.
const WORD_GAP_RATIO: f32 = 0.15;

/// Horizontal gap, as a share of line height, above which two segments on
/// one baseline belong to different columns.
const GUTTER_RATIO: f32 = 2.5;

/// A run of text as reported by pdfium.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub rect: BlockRect,
    pub text: String,
}

impl TextSegment {
    pub fn new(rect: BlockRect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
        }
    }
}

/// A group of lines translated as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub rect: BlockRect,
    pub text: String,
}

/// What the pipeline needs to know about one source page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageScan {
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<TextBlock>,
    pub image_count: usize,
}

impl PageScan {
    pub fn char_count(&self) -> usize {
        self.blocks.iter().map(|b| b.text.chars().count()).sum()
    }
}

struct Line {
    rect: BlockRect,
    segments: Vec<TextSegment>,
}

impl Line {
    fn centre(&self) -> f32 {
        (self.rect.top + self.rect.bottom) / 2.0
    }

    fn accepts(&self, seg: &TextSegment) -> bool {
        let centre = (seg.rect.top + seg.rect.bottom) / 2.0;
        (centre >= self.rect.bottom && centre <= self.rect.top)
            || (self.centre() >= seg.rect.bottom && self.centre() <= seg.rect.top)
    }

    /// Cut a band at every gap wider than a column gutter.
    fn split_columns(mut self) -> Vec<Line> {
        self.segments.sort_by(|a, b| a.rect.left.total_cmp(&b.rect.left));
        let gutter = self.rect.height() * GUTTER_RATIO;

        let mut lines: Vec<Line> = Vec::new();
        for seg in self.segments {
            match lines.last_mut() {
                Some(line) if seg.rect.left - line.rect.right <= gutter => {
                    line.rect = line.rect.union(&seg.rect);
                    line.segments.push(seg);
                }
                _ => lines.push(Line {
                    rect: seg.rect,
                    segments: vec![seg],
                }),
            }
        }
        lines
    }

    fn text(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&TextSegment> = None;
        for seg in &self.segments {
            if let Some(p) = prev {
                let gap = seg.rect.left - p.rect.right;
                let separated = p.text.ends_with(char::is_whitespace)
                    || seg.text.starts_with(char::is_whitespace);
                if !separated && gap > self.rect.height() * WORD_GAP_RATIO {
                    out.push(' ');
                }
            }
            out.push_str(&seg.text);
            prev = Some(seg);
        }
        out.trim().to_string()
    }
}

/// Group raw segments into blocks, top of the page first.
pub fn group_segments(mut segments: Vec<TextSegment>) -> Vec<TextBlock> {
    segments.retain(|s| !s.text.is_empty());
    segments.sort_by(|a, b| {
        b.rect
            .top
            .total_cmp(&a.rect.top)
            .then(a.rect.left.total_cmp(&b.rect.left))
    });

    let mut bands: Vec<Line> = Vec::new();
    for seg in segments {
        match bands.last_mut() {
            Some(band) if band.accepts(&seg) => {
                band.rect = band.rect.union(&seg.rect);
                band.segments.push(seg);
            }
            _ => bands.push(Line {
                rect: seg.rect,
                segments: vec![seg],
            }),
        }
    }
    let lines = bands.into_iter().flat_map(Line::split_columns);

    // Columns interleave band by band, so a line may continue any open block,
    // not only the latest one. `last_lines[i]` is the bottom line of `blocks[i]`.
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut last_lines: Vec<BlockRect> = Vec::new();
    for line in lines {
        let text = line.text();
        let target = (0..blocks.len()).rev().find(|&i| {
            let prev = last_lines[i];
            let gap = prev.bottom - line.rect.top;
            gap > -prev.height() * 0.5
                && gap <= prev.height() * BLOCK_GAP_RATIO
                && line.rect.left <= blocks[i].rect.right
                && line.rect.right >= blocks[i].rect.left
        });
        match target {
            Some(i) => {
                let block = &mut blocks[i];
                block.rect = block.rect.union(&line.rect);
                block.text.push('\n');
                block.text.push_str(&text);
                last_lines[i] = line.rect;
            }
            None => {
                blocks.push(TextBlock {
                    rect: line.rect,
                    text,
                });
                last_lines.push(line.rect);
            }
        }
    }

    blocks.retain(|b| !b.text.trim().is_empty());
    blocks
}

/// Open a PDF held in memory.
pub fn open_document<'a>(pdfium: &'a Pdfium, bytes: &'a [u8]) -> Result<PdfDocument<'a>, PaperworkError> {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| PaperworkError::CorruptPdf {
            detail: format!("{:?}", e),
        })
}

/// Scan every page of an open document.
pub fn scan_document(document: &PdfDocument) -> Result<Vec<PageScan>, PaperworkError> {
    let mut scans = Vec::new();

    for (idx, page) in document.pages().iter().enumerate() {
        let page_num = idx + 1;
        let text = page.text().map_err(|e| PaperworkError::CorruptPdf {
            detail: format!("page {page_num}: cannot read text: {:?}", e),
        })?;

        let segments: Vec<TextSegment> = text
            .segments()
            .iter()
            .map(|seg| {
                let b = seg.bounds();
                TextSegment::new(
                    BlockRect::new(b.left().value, b.bottom().value, b.right().value, b.top().value),
                    seg.text(),
                )
            })
            .collect();

        let image_count = page
            .objects()
            .iter()
            .filter(|o| o.object_type() == PdfPageObjectType::Image)
            .count();

        let blocks = group_segments(segments);
        debug!(
            "Page {}: {} blocks, {} images",
            page_num,
            blocks.len(),
            image_count
        );

        scans.push(PageScan {
            width: page.width().value,
            height: page.height().value,
            blocks,
            image_count,
        });
    }

    Ok(scans)
}
