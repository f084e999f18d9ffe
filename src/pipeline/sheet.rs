//! Drawing instructions and the pdfium painter that executes them.
//!
//! Layout code (quote composer, structured-document reflow, block overlay)
//! produces plain [`Sheet`]s and [`Mark`]s without touching pdfium, which keeps
//! every position computation testable. Only [`paint_marks`] and
//! [`render_sheets`] talk to pdfium, and only inside a blocking task.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner.

use super::metrics::FontFace;
use crate::error::PaperworkError;
use crate::output::BlockRect;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Points per centimetre.
pub const CM: f32 = 72.0 / 2.54;

/// ISO A4 width in points.
pub const A4_WIDTH: f32 = 595.2756;

/// ISO A4 height in points.
pub const A4_HEIGHT: f32 = 841.8898;

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    fn to_pdf(self) -> PdfColor {
        PdfColor::new(self.0, self.1, self.2, 255)
    }
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// A single line of text starting at `x` on `baseline`.
    Text {
        x: f32,
        baseline: f32,
        text: String,
        face: FontFace,
        size: f32,
    },
    /// The image at index `image` of the painter's image list.
    Image {
        image: usize,
        x: f32,
        bottom: f32,
        width: f32,
        height: f32,
    },
    /// A rectangle, filled and/or stroked.
    Rect {
        rect: BlockRect,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
}

impl Mark {
    pub fn text(x: f32, baseline: f32, text: impl Into<String>, face: FontFace, size: f32) -> Self {
        Mark::Text {
            x,
            baseline,
            text: text.into(),
            face,
            size,
        }
    }

    /// Text content of a text mark.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Mark::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A page to be created from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub width: f32,
    pub height: f32,
    pub marks: Vec<Mark>,
}

impl Sheet {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            marks: Vec::new(),
        }
    }

    pub fn a4() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT)
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Text of every text mark, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().filter_map(Mark::as_text)
    }
}

/// Font handles registered in one document.
#[derive(Clone, Copy)]
pub struct FontSet {
    regular: PdfFontToken,
    bold: PdfFontToken,
}

impl FontSet {
    pub fn load(document: &mut PdfDocument) -> Self {
        let fonts = document.fonts_mut();
        Self {
            regular: fonts.helvetica(),
            bold: fonts.helvetica_bold(),
        }
    }

    fn token(&self, face: FontFace) -> PdfFontToken {
        match face {
            FontFace::Regular => self.regular,
            FontFace::Bold => self.bold,
        }
    }
}

/// Paint `marks` onto an existing page. `page_num` is 1-indexed, for errors.
pub fn paint_marks(
    page: &mut PdfPage,
    marks: &[Mark],
    fonts: &FontSet,
    images: &[DynamicImage],
    page_num: usize,
) -> Result<(), PaperworkError> {
    let fail = |e: PdfiumError| PaperworkError::RenderFailed {
        page: page_num,
        detail: format!("{:?}", e),
    };

    for mark in marks {
        match mark {
            Mark::Text {
                x,
                baseline,
                text,
                face,
                size,
            } => {
                if text.is_empty() {
                    continue;
                }
                page.objects_mut()
                    .create_text_object(
                        PdfPoints::new(*x),
                        PdfPoints::new(*baseline),
                        text,
                        fonts.token(*face),
                        PdfPoints::new(*size),
                    )
                    .map_err(fail)?;
            }
            Mark::Image {
                image,
                x,
                bottom,
                width,
                height,
            } => {
                let Some(img) = images.get(*image) else {
                    return Err(PaperworkError::Internal(format!(
                        "image mark refers to missing image {image}"
                    )));
                };
                page.objects_mut()
                    .create_image_object(
                        PdfPoints::new(*x),
                        PdfPoints::new(*bottom),
                        img,
                        Some(PdfPoints::new(*width)),
                        Some(PdfPoints::new(*height)),
                    )
                    .map_err(fail)?;
            }
            Mark::Rect { rect, fill, stroke } => {
                page.objects_mut()
                    .create_path_object_rect(
                        PdfRect::new_from_values(rect.bottom, rect.left, rect.top, rect.right),
                        stroke.map(Rgb::to_pdf),
                        stroke.map(|_| PdfPoints::new(0.5)),
                        fill.map(Rgb::to_pdf),
                    )
                    .map_err(fail)?;
            }
        }
    }

    Ok(())
}

/// Create a new document with one page per sheet and return its bytes.
pub fn render_sheets(
    pdfium: &Pdfium,
    sheets: &[Sheet],
    images: &[DynamicImage],
) -> Result<Vec<u8>, PaperworkError> {
    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| PaperworkError::RenderFailed {
            page: 0,
            detail: format!("{:?}", e),
        })?;
    let fonts = FontSet::load(&mut document);

    for (idx, sheet) in sheets.iter().enumerate() {
        let page_num = idx + 1;
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(sheet.width),
                PdfPoints::new(sheet.height),
            ))
            .map_err(|e| PaperworkError::RenderFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;
        paint_marks(&mut page, &sheet.marks, &fonts, images, page_num)?;
        debug!("Painted page {} with {} marks", page_num, sheet.marks.len());
    }

    document
        .save_to_bytes()
        .map_err(|e| PaperworkError::RenderFailed {
            page: 0,
            detail: format!("save failed: {:?}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_dimensions_in_points() {
        assert!((A4_WIDTH - 21.0 * CM).abs() < 0.01);
        assert!((A4_HEIGHT - 29.7 * CM).abs() < 0.01);
    }

    #[test]
    fn sheet_texts_skip_other_marks() {
        let mut sheet = Sheet::a4();
        sheet.push(Mark::text(10.0, 10.0, "one", FontFace::Regular, 12.0));
        sheet.push(Mark::Rect {
            rect: BlockRect::new(0.0, 0.0, 1.0, 1.0),
            fill: Some(Rgb::WHITE),
            stroke: None,
        });
        sheet.push(Mark::text(10.0, 20.0, "two", FontFace::Bold, 12.0));
        assert_eq!(sheet.texts().collect::<Vec<_>>(), vec!["one", "two"]);
    }
}
