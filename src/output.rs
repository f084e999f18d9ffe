//! Output types returned by the composer and the translator.

use crate::error::{PaperworkError, UnitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::Path;

/// A complete PDF held in memory.
///
/// Produced once and never mutated; the caller decides whether to offer it
/// for download, write it to disk, or stream it elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    page_count: usize,
}

impl RenderedDocument {
    pub(crate) fn new(bytes: Vec<u8>, page_count: usize) -> Self {
        Self { bytes, page_count }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// A reader positioned at the first byte of the PDF.
    pub fn cursor(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.bytes)
    }

    /// Write the PDF to `path`.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub fn write_to(&self, path: &Path) -> Result<(), PaperworkError> {
        let fail = |source| PaperworkError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(fail)?;
        }

        let tmp_path = path.with_extension("pdf.tmp");
        let written = std::fs::write(&tmp_path, &self.bytes)
            .and_then(|()| std::fs::rename(&tmp_path, path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(fail(e));
        }
        Ok(())
    }
}

/// The two ways the pipeline can translate a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Paint translations over whited-out copies of the original text blocks.
    Overlay,
    /// Round-trip through a paragraphs-and-tables document and reflow it.
    Conversion,
}

impl StrategyKind {
    /// The strategy used when this one fails.
    pub fn other(self) -> Self {
        match self {
            StrategyKind::Overlay => StrategyKind::Conversion,
            StrategyKind::Conversion => StrategyKind::Overlay,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Overlay => "block-overlay",
            StrategyKind::Conversion => "document-conversion",
        })
    }
}

/// Heuristic summary of a source PDF, used only to pick a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// Enough `|` or tab characters to suggest tabular content.
    pub has_tables: bool,
    /// At least one page embeds an image.
    pub has_images: bool,
    /// At least one page has more text blocks than the threshold.
    pub complex_layout: bool,
    /// Total extracted character count.
    pub text_chars: usize,
    pub page_count: usize,
    pub max_blocks_per_page: usize,
}

impl DocumentStructure {
    /// Strategy the selector tries first for this structure.
    pub fn preferred_strategy(&self) -> StrategyKind {
        if self.has_tables || self.complex_layout {
            StrategyKind::Conversion
        } else {
            StrategyKind::Overlay
        }
    }
}

/// A rectangle in PDF points, bottom-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockRect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl BlockRect {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn union(&self, other: &BlockRect) -> BlockRect {
        BlockRect {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }
}

/// A rectangular text region of a source page and its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// 1-indexed page number.
    pub page: usize,
    /// 1-indexed position within the strategy run.
    pub index: usize,
    pub rect: BlockRect,
    pub text: String,
}

/// The result of translating one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    pub unit: TranslationUnit,
    pub result: Result<String, UnitError>,
}

/// Counters for one translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    pub total_units: usize,
    pub translated_units: usize,
    pub failed_units: usize,
    pub duration_ms: u64,
}

/// A finished translation.
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    pub document: RenderedDocument,
    /// The strategy that produced `document`.
    pub strategy: StrategyKind,
    /// True when the first strategy failed and the other one succeeded.
    pub fallback_used: bool,
    pub structure: DocumentStructure,
    /// Every skipped unit, in document order.
    pub warnings: Vec<UnitError>,
    pub stats: TranslationStats,
}

impl TranslationOutput {
    /// Serialisable summary without the PDF bytes.
    pub fn summary(&self) -> TranslationSummary {
        TranslationSummary {
            strategy: self.strategy,
            fallback_used: self.fallback_used,
            structure: self.structure.clone(),
            warnings: self.warnings.iter().map(|w| w.to_string()).collect(),
            stats: self.stats.clone(),
            page_count: self.document.page_count(),
            bytes: self.document.len(),
        }
    }
}

/// JSON-friendly view of a [`TranslationOutput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSummary {
    pub strategy: StrategyKind,
    pub fallback_used: bool,
    pub structure: DocumentStructure,
    pub warnings: Vec<String>,
    pub stats: TranslationStats,
    pub page_count: usize,
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn cursor_starts_at_beginning() {
        let doc = RenderedDocument::new(b"%PDF-1.7 body".to_vec(), 1);
        let mut head = [0u8; 5];
        doc.cursor().read_exact(&mut head).unwrap();
        assert_eq!(&head, b"%PDF-");
    }

    #[test]
    fn write_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.pdf");
        let doc = RenderedDocument::new(b"%PDF-1.7".to_vec(), 1);
        doc.write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        assert!(!path.with_extension("pdf.tmp").exists());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory in the way makes the rename fail.
        let path = dir.path().join("out.pdf");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let doc = RenderedDocument::new(b"%PDF-1.7".to_vec(), 1);
        let err = doc.write_to(&path).unwrap_err();
        assert!(matches!(err, PaperworkError::OutputWriteFailed { .. }), "{err}");
        assert!(!path.with_extension("pdf.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn preferred_strategy_follows_structure() {
        let plain = DocumentStructure::default();
        assert_eq!(plain.preferred_strategy(), StrategyKind::Overlay);

        let tabular = DocumentStructure {
            has_tables: true,
            ..Default::default()
        };
        assert_eq!(tabular.preferred_strategy(), StrategyKind::Conversion);

        let complex = DocumentStructure {
            complex_layout: true,
            has_images: true,
            ..Default::default()
        };
        assert_eq!(complex.preferred_strategy(), StrategyKind::Conversion);

        let images_only = DocumentStructure {
            has_images: true,
            ..Default::default()
        };
        assert_eq!(images_only.preferred_strategy(), StrategyKind::Overlay);
    }

    #[test]
    fn strategy_other_is_involution() {
        for k in [StrategyKind::Overlay, StrategyKind::Conversion] {
            assert_ne!(k.other(), k);
            assert_eq!(k.other().other(), k);
        }
    }

    #[test]
    fn rect_union() {
        let a = BlockRect::new(10.0, 10.0, 20.0, 20.0);
        let b = BlockRect::new(15.0, 5.0, 30.0, 18.0);
        assert_eq!(a.union(&b), BlockRect::new(10.0, 5.0, 30.0, 20.0));
        assert_eq!(a.width(), 10.0);
        assert_eq!(b.height(), 13.0);
    }
}
