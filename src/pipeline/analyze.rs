//! Structure analyzer: a cheap heuristic summary used to pick a strategy.

use super::extract::PageScan;
use crate::config::AnalyzerThresholds;
use crate::output::DocumentStructure;

/// Summarise scanned pages.
///
/// * `has_tables`: total `|` and tab characters reach `table_marker_count`
/// * `has_images`: any page embeds an image
/// * `complex_layout`: some page has more than `complex_block_count` blocks
pub fn analyze(pages: &[PageScan], thresholds: &AnalyzerThresholds) -> DocumentStructure {
    let markers: usize = pages
        .iter()
        .flat_map(|p| p.blocks.iter())
        .map(|b| b.text.chars().filter(|c| *c == '|' || *c == '\t').count())
        .sum();
    let max_blocks = pages.iter().map(|p| p.blocks.len()).max().unwrap_or(0);

    DocumentStructure {
        has_tables: markers >= thresholds.table_marker_count,
        has_images: pages.iter().any(|p| p.image_count > 0),
        complex_layout: max_blocks > thresholds.complex_block_count,
        text_chars: pages.iter().map(PageScan::char_count).sum(),
        page_count: pages.len(),
        max_blocks_per_page: max_blocks,
    }
}
