//! Quote-PDF composer entry points.
//!
//! A quote is always a fresh A4 document drawn from a [`QuoteRequest`] and
//! a [`QuoteTemplate`]. Image decoding and pdfium drawing both happen on the
//! blocking pool; the layout itself is pure (see [`crate::pipeline::quote`]).

use crate::config::QuoteTemplate;
use crate::engine;
use crate::error::PaperworkError;
use crate::output::RenderedDocument;
use crate::pipeline::image::normalise_upload;
use crate::pipeline::quote::{layout_quote, ImageRef};
use crate::pipeline::sheet::render_sheets;
use crate::request::QuoteRequest;
use chrono::{Local, NaiveDate};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Compose the quote PDF.
///
/// # Errors
/// - [`PaperworkError::MissingInput`] when the client name is blank
/// - [`PaperworkError::ImageDecode`] when the logo or banner is not a
///   readable JPEG/PNG
/// - [`PaperworkError::PdfiumBindingFailed`] / [`PaperworkError::RenderFailed`]
///   for pdfium problems
pub async fn compose_quote_async(
    request: &QuoteRequest,
    template: &QuoteTemplate,
) -> Result<RenderedDocument, PaperworkError> {
    request.validate()?;
    template.validate()?;

    let date = request.issued_on.unwrap_or_else(|| Local::now().date_naive());
    let request = request.clone();
    let template = template.clone();

    engine::run_blocking("Compose", move || compose_blocking(&request, &template, date)).await
}

/// Synchronous wrapper around [`compose_quote_async`].
///
/// Creates a temporary tokio runtime internally.
pub fn compose_quote(
    request: &QuoteRequest,
    template: &QuoteTemplate,
) -> Result<RenderedDocument, PaperworkError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PaperworkError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(compose_quote_async(request, template))
}

/// Compose the quote and write it into `dir` as `orcamento_<client>.pdf`.
///
/// Returns the path written.
pub async fn compose_quote_to_dir(
    request: &QuoteRequest,
    template: &QuoteTemplate,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, PaperworkError> {
    let document = compose_quote_async(request, template).await?;
    let path = dir.as_ref().join(request.output_filename());
    document.write_to(&path)?;
    info!("Quote written to {}", path.display());
    Ok(path)
}

fn compose_blocking(
    request: &QuoteRequest,
    template: &QuoteTemplate,
    date: NaiveDate,
) -> Result<RenderedDocument, PaperworkError> {
    let start = Instant::now();
    let mut images: Vec<DynamicImage> = Vec::new();

    let mut load = |bytes: Option<&Vec<u8>>, slot: &'static str| -> Result<Option<ImageRef>, PaperworkError> {
        let Some(bytes) = bytes.filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        let img = normalise_upload(bytes, slot)?;
        let placed = ImageRef {
            index: images.len(),
            width: img.width(),
            height: img.height(),
        };
        images.push(img);
        Ok(Some(placed))
    };
    let logo = load(request.logo.as_ref(), "logo")?;
    let header = load(request.header_image.as_ref(), "header")?;

    let sheets = layout_quote(request, template, date, logo, header);
    debug!("Quote laid out on {} page(s)", sheets.len());

    let pdfium = engine::bind()?;
    let bytes = render_sheets(&pdfium, &sheets, &images)?;

    info!(
        "Quote for '{}' composed: {} page(s), {} bytes, {}ms",
        request.client_name,
        sheets.len(),
        bytes.len(),
        start.elapsed().as_millis()
    );
    Ok(RenderedDocument::new(bytes, sheets.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_client_name_rejected_before_rendering() {
        let request = QuoteRequest {
            client_name: " ".into(),
            ..Default::default()
        };
        let err = compose_quote_async(&request, &QuoteTemplate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PaperworkError::MissingInput { field: "client name" }));
    }

    #[tokio::test]
    async fn invalid_template_rejected() {
        let request = QuoteRequest {
            client_name: "Ana".into(),
            ..Default::default()
        };
        let template = QuoteTemplate {
            wrap_columns: 0,
            ..Default::default()
        };
        let err = compose_quote_async(&request, &template).await.unwrap_err();
        assert!(matches!(err, PaperworkError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn undecodable_logo_is_fatal() {
        let request = QuoteRequest {
            client_name: "Ana".into(),
            logo: Some(b"GIF89a not really".to_vec()),
            ..Default::default()
        };
        let err = compose_quote_async(&request, &QuoteTemplate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PaperworkError::ImageDecode { slot: "logo", .. }));
    }
}
