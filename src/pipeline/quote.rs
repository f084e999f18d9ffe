//! Quote page layout.
//!
//! Turns a [`QuoteRequest`] and a [`QuoteTemplate`] into [`Sheet`]s. Every
//! position is an absolute offset from the top-left corner of an A4 page;
//! nothing reflows except the word wrapping of individual lines. The pdfium
//! work happens later in [`super::sheet::render_sheets`].

use super::image::fit_within;
use super::metrics::{text_width, FontFace};
use super::sheet::{Mark, Sheet, A4_HEIGHT, A4_WIDTH, CM};
use super::wrap::wrap_columns;
use crate::config::{OverflowPolicy, QuoteTemplate};
use crate::request::QuoteRequest;
use chrono::NaiveDate;

const LEFT: f32 = 2.0 * CM;
const COUNTERPARTY_X: f32 = 10.0 * CM;
const TITLE_BASELINE: f32 = 10.0 * CM;
const FIELDS_TOP: f32 = 12.0 * CM;
const FOOTER_BASELINE_FROM_BOTTOM: f32 = 1.5 * CM;
/// Lowest baseline (from the bottom) before a page break.
const BOTTOM_LIMIT: f32 = 2.5 * CM;
/// First baseline (from the top) of a continuation page.
const CONTINUATION_TOP: f32 = 2.0 * CM;

const TITLE_SIZE: f32 = 16.0;
const FIELD_SIZE: f32 = 12.0;
const TERMS_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

const SIGNATURE_RULE: &str = "___________________________";

/// An uploaded image already decoded: its index in the painter's image list
/// and its pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    pub index: usize,
    pub width: u32,
    pub height: u32,
}

/// Format a currency amount with thousands separators and two decimals.
///
/// `format_currency("R$", 1234.5)` → `"R$1,234.50"`.
pub fn format_currency(symbol: &str, value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{symbol}{sign}{grouped}.{frac}")
}

/// Lay out the quote. Returns one sheet, or more when content overflows and
/// the template asks for pagination.
pub fn layout_quote(
    request: &QuoteRequest,
    template: &QuoteTemplate,
    date: NaiveDate,
    logo: Option<ImageRef>,
    header: Option<ImageRef>,
) -> Vec<Sheet> {
    let mut first = Sheet::a4();

    if let Some(img) = logo {
        let (w, h) = fit_within(img.width, img.height, 4.0 * CM, 3.0 * CM);
        first.push(Mark::Image {
            image: img.index,
            x: LEFT,
            bottom: A4_HEIGHT - 4.0 * CM,
            width: w,
            height: h,
        });
    }

    if let Some(img) = header {
        let (w, h) = fit_within(img.width, img.height, 8.0 * CM, 3.5 * CM);
        first.push(Mark::Image {
            image: img.index,
            x: (A4_WIDTH - w) / 2.0,
            bottom: A4_HEIGHT - 8.0 * CM,
            width: w,
            height: h,
        });
    }

    let title_w = text_width(&template.title, FontFace::Bold, TITLE_SIZE);
    first.push(Mark::text(
        (A4_WIDTH - title_w) / 2.0,
        A4_HEIGHT - TITLE_BASELINE,
        template.title.clone(),
        FontFace::Bold,
        TITLE_SIZE,
    ));

    let mut writer = PageWriter::new(first, template);
    let cols = template.wrap_columns;

    let value = format_currency(&template.currency_symbol, request.agreed_value);
    let fields: [(&str, &str); 8] = [
        ("Cliente", &request.client_name),
        ("Telefone", &request.phone),
        ("Endereço", &request.address),
        ("Prazo de Execução", &request.deadline),
        ("Descrição do Serviço", &request.service_description),
        ("Forma de Pagamento", &request.payment_terms),
        ("Valor Acordado", &value),
        ("Observação", &request.note),
    ];
    for (label, field) in fields {
        writer.wrapped(&format!("{label}: {field}"), FontFace::Regular, FIELD_SIZE, cols);
    }

    writer.advance(1);
    writer.wrapped(&template.terms_heading, FontFace::Bold, FIELD_SIZE, cols);
    for term in &template.terms {
        writer.advance(1);
        writer.wrapped(term, FontFace::Regular, TERMS_SIZE, cols);
    }

    writer.advance(2);
    writer.draw(
        LEFT,
        &format!("Data: {}", date.format("%d/%m/%Y")),
        FontFace::Regular,
        TERMS_SIZE,
    );
    writer.advance(1);
    writer.draw(LEFT, &format!("Cliente: {SIGNATURE_RULE}"), FontFace::Regular, TERMS_SIZE);
    writer.advance(1);
    writer.draw(LEFT, &request.client_name, FontFace::Regular, TERMS_SIZE);
    writer.draw(
        COUNTERPARTY_X,
        &format!("{}: {SIGNATURE_RULE}", template.counterparty),
        FontFace::Regular,
        TERMS_SIZE,
    );
    writer.advance(1);

    writer.finish()
}

/// Cursor over the quote pages; `y` is the next baseline measured from the top.
struct PageWriter<'a> {
    sheets: Vec<Sheet>,
    y: f32,
    pitch: f32,
    template: &'a QuoteTemplate,
}

impl<'a> PageWriter<'a> {
    fn new(first: Sheet, template: &'a QuoteTemplate) -> Self {
        Self {
            sheets: vec![first],
            y: FIELDS_TOP,
            pitch: template.line_pitch_cm * CM,
            template,
        }
    }

    fn advance(&mut self, lines: usize) {
        self.y += self.pitch * lines as f32;
    }

    /// Draw one line at the current baseline without advancing.
    fn draw(&mut self, x: f32, text: &str, face: FontFace, size: f32) {
        if self.template.overflow == OverflowPolicy::Paginate
            && A4_HEIGHT - self.y < BOTTOM_LIMIT
        {
            self.sheets.push(Sheet::a4());
            self.y = CONTINUATION_TOP;
        }
        let baseline = A4_HEIGHT - self.y;
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.push(Mark::text(x, baseline, text, face, size));
        }
    }

    fn wrapped(&mut self, text: &str, face: FontFace, size: f32, columns: usize) {
        for line in wrap_columns(text, columns) {
            self.draw(LEFT, &line, face, size);
            self.advance(1);
        }
    }

    fn finish(mut self) -> Vec<Sheet> {
        for sheet in &mut self.sheets {
            sheet.push(Mark::text(
                LEFT,
                FOOTER_BASELINE_FROM_BOTTOM,
                self.template.footer.clone(),
                FontFace::Regular,
                FOOTER_SIZE,
            ));
        }
        self.sheets
    }
}
