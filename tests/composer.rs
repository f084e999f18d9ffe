//! Integration tests for the quote composer.
//!
//! They need a pdfium library (`PDFIUM_LIB_PATH`, `./libpdfium.*` or a
//! system install) and print SKIP when none can be bound.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/opt/pdfium/lib cargo test --test composer -- --nocapture

use chrono::NaiveDate;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use paperwork::{
    compose_quote, compose_quote_async, compose_quote_to_dir, engine, OverflowPolicy,
    PaperworkError, QuoteRequest, QuoteTemplate,
};
use pdfium_render::prelude::*;
use std::io::Cursor;

macro_rules! skip_without_pdfium {
    () => {
        if !engine::is_available() {
            println!("SKIP — pdfium library not found (set PDFIUM_LIB_PATH)");
            return;
        }
    };
}

fn sample_request() -> QuoteRequest {
    QuoteRequest {
        client_name: "Ana Souza".into(),
        phone: "(11) 99999-0000".into(),
        address: "Rua das Flores, 10".into(),
        deadline: "15 dias".into(),
        service_description: "Demolicao de muro e remocao de entulho".into(),
        payment_terms: "50% na entrada".into(),
        agreed_value: 1234.5,
        note: "Sem observacoes".into(),
        issued_on: NaiveDate::from_ymd_opt(2024, 3, 5),
        ..Default::default()
    }
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_pixel(w, h, Rgb([200, 30, 30]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// All text pdfium can read back, page by page.
fn page_texts(bytes: &[u8]) -> Vec<String> {
    let pdfium = engine::bind().unwrap();
    let doc = pdfium.load_pdf_from_byte_slice(bytes, None).unwrap();
    doc.pages()
        .iter()
        .map(|page| page.text().map(|t| t.all()).unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn quote_is_a_single_a4_page_with_the_form_data() {
    skip_without_pdfium!();

    let pdf = compose_quote_async(&sample_request(), &QuoteTemplate::default())
        .await
        .expect("compose");
    assert!(pdf.as_bytes().starts_with(b"%PDF-"));
    assert_eq!(pdf.page_count(), 1);

    let texts = page_texts(pdf.as_bytes());
    assert_eq!(texts.len(), 1);
    let text = &texts[0];
    for needle in ["Ana Souza", "Rua das Flores, 10", "1,234.50", "05/03/2024"] {
        assert!(text.contains(needle), "missing {needle:?} in:\n{text}");
    }
    assert!(text.contains("Demolidora Genial"), "footer missing");
}

#[test]
fn sync_wrapper_matches_async_output_shape() {
    skip_without_pdfium!();

    let pdf = compose_quote(&sample_request(), &QuoteTemplate::default()).expect("compose");
    assert!(pdf.as_bytes().starts_with(b"%PDF-"));
    assert_eq!(pdf.page_count(), 1);
}

#[tokio::test]
async fn logo_and_banner_are_embedded() {
    skip_without_pdfium!();

    let request = QuoteRequest {
        logo: Some(png_bytes(120, 60)),
        header_image: Some(png_bytes(800, 120)),
        ..sample_request()
    };
    let pdf = compose_quote_async(&request, &QuoteTemplate::default())
        .await
        .expect("compose");

    let pdfium = engine::bind().unwrap();
    let doc = pdfium.load_pdf_from_byte_slice(pdf.as_bytes(), None).unwrap();
    let page = doc.pages().iter().next().unwrap();
    let images = page
        .objects()
        .iter()
        .filter(|o| o.object_type() == PdfPageObjectType::Image)
        .count();
    assert_eq!(images, 2);
}

#[tokio::test]
async fn long_description_paginates_and_repeats_footer() {
    skip_without_pdfium!();

    let request = QuoteRequest {
        service_description: "Remocao de alvenaria e entulho. ".repeat(400),
        ..sample_request()
    };
    let pdf = compose_quote_async(&request, &QuoteTemplate::default())
        .await
        .expect("compose");
    assert!(pdf.page_count() > 1);

    let texts = page_texts(pdf.as_bytes());
    assert_eq!(texts.len(), pdf.page_count());
    for (i, text) in texts.iter().enumerate() {
        assert!(text.contains("Demolidora Genial"), "page {} has no footer", i + 1);
    }
}

#[tokio::test]
async fn clip_policy_keeps_one_page() {
    skip_without_pdfium!();

    let request = QuoteRequest {
        service_description: "Remocao de alvenaria e entulho. ".repeat(400),
        ..sample_request()
    };
    let template = QuoteTemplate {
        overflow: OverflowPolicy::Clip,
        ..Default::default()
    };
    let pdf = compose_quote_async(&request, &template).await.expect("compose");
    assert_eq!(pdf.page_count(), 1);
}

#[tokio::test]
async fn quote_written_with_clean_filename() {
    skip_without_pdfium!();

    let dir = tempfile::tempdir().unwrap();
    let request = QuoteRequest {
        client_name: "Ana/Souza: Obras?".into(),
        ..sample_request()
    };
    let path = compose_quote_to_dir(&request, &QuoteTemplate::default(), dir.path())
        .await
        .expect("compose");

    assert_eq!(path.parent(), Some(dir.path()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("orcamento_"), "{name}");
    assert!(name.ends_with(".pdf"));
    assert!(!name.contains('/') && !name.contains(':') && !name.contains('?'));

    let written = std::fs::read(&path).unwrap();
    assert!(written.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn corrupt_logo_fails_without_output() {
    let request = QuoteRequest {
        logo: Some(vec![0x89, b'P', b'N', b'G', 0, 0, 0]),
        ..sample_request()
    };
    let err = compose_quote_async(&request, &QuoteTemplate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PaperworkError::ImageDecode { .. }), "{err}");
}
