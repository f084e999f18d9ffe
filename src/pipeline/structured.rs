//! Editable intermediate document for the conversion strategy.
//!
//! A [`StructuredDocument`] keeps only what survives a translation round
//! trip: page sizes, paragraphs and simple tables. It is persisted as JSON
//! between translation and reflow, and reflowed onto fresh pages with
//! width-based wrapping, so translated text longer than the source never
//! overlaps anything.

use super::extract::PageScan;
use super::metrics::FontFace;
use super::sheet::{Mark, Rgb, Sheet};
use super::wrap::wrap_to_width;
use crate::error::PaperworkError;
use crate::output::{BlockRect, TranslationUnit};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Page margin of reflowed pages, in points.
const MARGIN: f32 = 50.0;
const LINE_HEIGHT_FACTOR: f32 = 1.2;
const CELL_PADDING: f32 = 3.0;

static CELL_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\|\s*|\t+").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub pages: Vec<StructuredPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPage {
    pub width: f32,
    pub height: f32,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Paragraph { text: String },
    /// Rows of equal length.
    Table { rows: Vec<Vec<String>> },
}

/// Location of one translatable string inside a [`StructuredDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Paragraph { page: usize, element: usize },
    Cell { page: usize, element: usize, row: usize, col: usize },
}

/// Split a table-looking line into cells, or `None` for running text.
fn table_cells(line: &str) -> Option<Vec<String>> {
    if !line.contains('|') && !line.contains('\t') {
        return None;
    }
    let trimmed = line.trim().trim_start_matches('|').trim_end_matches('|');
    let cells: Vec<String> = CELL_SEPARATOR
        .split(trimmed)
        .map(|c| c.trim().to_string())
        .collect();
    (cells.len() >= 2).then_some(cells)
}

fn push_table(elements: &mut Vec<Element>, mut rows: Vec<Vec<String>>) {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(cols, String::new());
    }
    elements.push(Element::Table { rows });
}

impl StructuredDocument {
    /// Build from the analyzer's page scans.
    ///
    /// Within each block, consecutive `|`/tab separated lines become a table and
    /// the remaining runs of lines become paragraphs.
    pub fn from_scans(pages: &[PageScan]) -> Self {
        let pages = pages
            .iter()
            .map(|scan| {
                let mut elements = Vec::new();
                for block in &scan.blocks {
                    let mut paragraph: Vec<&str> = Vec::new();
                    let mut rows: Vec<Vec<String>> = Vec::new();

                    for line in block.text.lines() {
                        match table_cells(line) {
                            Some(cells) => {
                                if !paragraph.is_empty() {
                                    elements.push(Element::Paragraph {
                                        text: paragraph.join(" "),
                                    });
                                    paragraph.clear();
                                }
                                rows.push(cells);
                            }
                            None => {
                                if !rows.is_empty() {
                                    push_table(&mut elements, std::mem::take(&mut rows));
                                }
                                if !line.trim().is_empty() {
                                    paragraph.push(line.trim());
                                }
                            }
                        }
                    }
                    if !paragraph.is_empty() {
                        elements.push(Element::Paragraph {
                            text: paragraph.join(" "),
                        });
                    }
                    if !rows.is_empty() {
                        push_table(&mut elements, rows);
                    }
                }
                StructuredPage {
                    width: scan.width,
                    height: scan.height,
                    elements,
                }
            })
            .collect();
        Self { pages }
    }

    /// Every non-empty paragraph and table cell, in document order.
    pub fn translatable(&self) -> Vec<(Slot, TranslationUnit)> {
        let mut out = Vec::new();
        let mut push = |slot: Slot, page: usize, text: &str| {
            if text.trim().is_empty() {
                return;
            }
            let index = out.len() + 1;
            out.push((
                slot,
                TranslationUnit {
                    page: page + 1,
                    index,
                    rect: BlockRect::default(),
                    text: text.to_string(),
                },
            ));
        };

        for (p, page) in self.pages.iter().enumerate() {
            for (e, element) in page.elements.iter().enumerate() {
                match element {
                    Element::Paragraph { text } => push(Slot::Paragraph { page: p, element: e }, p, text.as_str()),
                    Element::Table { rows } => {
                        for (r, row) in rows.iter().enumerate() {
                            for (c, cell) in row.iter().enumerate() {
                                push(
                                    Slot::Cell {
                                        page: p,
                                        element: e,
                                        row: r,
                                        col: c,
                                    },
                                    p,
                                    cell.as_str(),
                                );
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// Replace the text at `slot`. Unknown slots are ignored.
    pub fn set_text(&mut self, slot: Slot, text: String) {
        match slot {
            Slot::Paragraph { page, element } => {
                if let Some(Element::Paragraph { text: t }) =
                    self.pages.get_mut(page).and_then(|p| p.elements.get_mut(element))
                {
                    *t = text;
                }
            }
            Slot::Cell { page, element, row, col } => {
                if let Some(Element::Table { rows }) =
                    self.pages.get_mut(page).and_then(|p| p.elements.get_mut(element))
                {
                    if let Some(cell) = rows.get_mut(row).and_then(|r| r.get_mut(col)) {
                        *cell = text;
                    }
                }
            }
        }
    }

    pub fn save_json(&self, path: &Path) -> Result<(), PaperworkError> {
        let fail = |detail: String| PaperworkError::IntermediateDocument {
            path: path.to_path_buf(),
            detail,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|e| fail(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| fail(e.to_string()))
    }

    pub fn load_json(path: &Path) -> Result<Self, PaperworkError> {
        let fail = |detail: String| PaperworkError::IntermediateDocument {
            path: path.to_path_buf(),
            detail,
        };
        let raw = std::fs::read(path).map_err(|e| fail(e.to_string()))?;
        serde_json::from_slice(&raw).map_err(|e| fail(e.to_string()))
    }

    /// Lay the document out onto sheets. Each source page starts a new sheet
    /// of the same size; overflowing content continues on extra sheets.
    pub fn reflow(&self, font_size: f32) -> Vec<Sheet> {
        let mut sheets = Vec::new();
        for page in &self.pages {
            let mut flow = Flow::new(page.width, page.height, font_size);
            for element in &page.elements {
                match element {
                    Element::Paragraph { text } => flow.paragraph(text),
                    Element::Table { rows } => flow.table(rows),
                }
            }
            sheets.extend(flow.finish());
        }
        debug!("Reflowed {} pages onto {} sheets", self.pages.len(), sheets.len());
        sheets
    }
}

/// Top-down cursor over the sheets of one source page.
struct Flow {
    sheets: Vec<Sheet>,
    width: f32,
    height: f32,
    size: f32,
    /// Distance of the next line's top from the page top.
    y: f32,
}

impl Flow {
    fn new(width: f32, height: f32, size: f32) -> Self {
        Self {
            sheets: vec![Sheet::new(width, height)],
            width,
            height,
            size,
            y: MARGIN,
        }
    }

    fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_FACTOR
    }

    fn content_width(&self) -> f32 {
        (self.width - 2.0 * MARGIN).max(self.size)
    }

    /// Break to a new sheet unless `needed` points fit below the cursor.
    /// Content taller than a whole page is placed anyway.
    fn reserve(&mut self, needed: f32) {
        if self.y + needed > self.height - MARGIN && self.y > MARGIN {
            self.sheets.push(Sheet::new(self.width, self.height));
            self.y = MARGIN;
        }
    }

    fn push(&mut self, mark: Mark) {
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.push(mark);
        }
    }

    fn paragraph(&mut self, text: &str) {
        let lh = self.line_height();
        for line in wrap_to_width(text, FontFace::Regular, self.size, self.content_width()) {
            self.reserve(lh);
            let baseline = self.height - self.y - self.size;
            self.push(Mark::text(MARGIN, baseline, line, FontFace::Regular, self.size));
            self.y += lh;
        }
        self.y += lh / 2.0;
    }

    fn table(&mut self, rows: &[Vec<String>]) {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if cols == 0 {
            return;
        }
        let lh = self.line_height();
        let col_width = self.content_width() / cols as f32;
        let text_width = (col_width - 2.0 * CELL_PADDING).max(self.size);

        for row in rows {
            let wrapped: Vec<Vec<String>> = row
                .iter()
                .map(|cell| wrap_to_width(cell, FontFace::Regular, self.size, text_width))
                .collect();
            let lines = wrapped.iter().map(Vec::len).max().unwrap_or(0).max(1);
            let row_height = lines as f32 * lh + 2.0 * CELL_PADDING;

            self.reserve(row_height);
            let top = self.height - self.y;
            for c in 0..cols {
                let left = MARGIN + c as f32 * col_width;
                self.push(Mark::Rect {
                    rect: BlockRect::new(left, top - row_height, left + col_width, top),
                    fill: None,
                    stroke: Some(Rgb::BLACK),
                });
                if let Some(cell_lines) = wrapped.get(c) {
                    for (i, line) in cell_lines.iter().enumerate() {
                        let baseline = top - CELL_PADDING - self.size - i as f32 * lh;
                        self.push(Mark::text(
                            left + CELL_PADDING,
                            baseline,
                            line.clone(),
                            FontFace::Regular,
                            self.size,
                        ));
                    }
                }
            }
            self.y += row_height;
        }
        self.y += lh / 2.0;
    }

    fn finish(self) -> Vec<Sheet> {
        self.sheets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::TextBlock;

    fn scan(blocks: &[&str]) -> PageScan {
        PageScan {
            width: 595.0,
            height: 842.0,
            blocks: blocks
                .iter()
                .map(|t| TextBlock {
                    rect: BlockRect::new(50.0, 700.0, 300.0, 730.0),
                    text: t.to_string(),
                })
                .collect(),
            image_count: 0,
        }
    }

    #[test]
    fn splits_table_cells() {
        assert_eq!(table_cells("| Item | Qtd |"), Some(vec!["Item".into(), "Qtd".into()]));
        assert_eq!(table_cells("a\tb\t\tc"), Some(vec!["a".into(), "b".into(), "c".into()]));
        assert_eq!(table_cells("plain text"), None);
        assert_eq!(table_cells("only | "), None);
    }

    #[test]
    fn blocks_become_paragraphs_and_tables() {
        let doc = StructuredDocument::from_scans(&[scan(&[
            "Relatório anual\nda empresa",
            "Intro line\nItem | Qtd\nMuro | 2\nPorta | 1 | extra\nFim",
        ])]);
        let elements = &doc.pages[0].elements;
        assert_eq!(
            elements,
            &vec![
                Element::Paragraph {
                    text: "Relatório anual da empresa".into()
                },
                Element::Paragraph {
                    text: "Intro line".into()
                },
                Element::Table {
                    rows: vec![
                        vec!["Item".into(), "Qtd".into(), "".into()],
                        vec!["Muro".into(), "2".into(), "".into()],
                        vec!["Porta".into(), "1".into(), "extra".into()],
                    ]
                },
                Element::Paragraph { text: "Fim".into() },
            ]
        );
    }

    #[test]
    fn translatable_skips_empty_cells_and_numbers_units() {
        let doc = StructuredDocument::from_scans(&[scan(&["Título"]), scan(&["a | | b"])]);
        let units = doc.translatable();
        let texts: Vec<(usize, usize, &str)> = units
            .iter()
            .map(|(_, u)| (u.page, u.index, u.text.as_str()))
            .collect();
        assert_eq!(texts, vec![(1, 1, "Título"), (2, 2, "a"), (2, 3, "b")]);
        assert_eq!(
            units[2].0,
            Slot::Cell {
                page: 1,
                element: 0,
                row: 0,
                col: 2
            }
        );
    }

    #[test]
    fn set_text_replaces_in_place() {
        let mut doc = StructuredDocument::from_scans(&[scan(&["Olá", "x | y"])]);
        for (slot, unit) in doc.translatable() {
            doc.set_text(slot, unit.text.to_uppercase());
        }
        assert_eq!(
            doc.pages[0].elements,
            vec![
                Element::Paragraph { text: "OLÁ".into() },
                Element::Table {
                    rows: vec![vec!["X".into(), "Y".into()]]
                },
            ]
        );
    }

    #[test]
    fn json_round_trip_through_file() {
        let doc = StructuredDocument::from_scans(&[scan(&["Olá", "x | y"]), scan(&[])]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        doc.save_json(&path).unwrap();
        assert_eq!(StructuredDocument::load_json(&path).unwrap(), doc);
    }

    #[test]
    fn load_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = StructuredDocument::load_json(&path).unwrap_err();
        assert!(matches!(err, PaperworkError::IntermediateDocument { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn empty_page_still_yields_a_sheet() {
        let doc = StructuredDocument::from_scans(&[scan(&["a"]), scan(&[]), scan(&["b"])]);
        let sheets = doc.reflow(10.0);
        assert_eq!(sheets.len(), 3);
        assert!(sheets[1].marks.is_empty());
    }

    #[test]
    fn reflow_keeps_lines_inside_margins() {
        let long = "palavra ".repeat(2000);
        let doc = StructuredDocument::from_scans(&[scan(&[long.as_str()])]);
        let sheets = doc.reflow(10.0);
        assert!(sheets.len() > 1, "long text continues on extra sheets");
        for sheet in &sheets {
            assert_eq!((sheet.width, sheet.height), (595.0, 842.0));
            for mark in &sheet.marks {
                if let Mark::Text { baseline, text, .. } = mark {
                    assert!(*baseline >= MARGIN - 10.0, "{text} at {baseline}");
                    assert!(*baseline <= 842.0 - MARGIN);
                }
            }
        }
    }

    #[test]
    fn table_cells_get_borders() {
        let doc = StructuredDocument::from_scans(&[scan(&["a | b\nc | d"])]);
        let sheets = doc.reflow(10.0);
        let borders = sheets[0]
            .marks
            .iter()
            .filter(|m| matches!(m, Mark::Rect { stroke: Some(_), .. }))
            .count();
        assert_eq!(borders, 4);
        let texts: Vec<&str> = sheets[0].texts().collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }
}
