//! Integration tests for the PDF translator.
//!
//! Source documents are generated with the quote composer, or with pdfium
//! directly, so no fixture files are needed. The translation service is a
//! local stub: no network access.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/opt/pdfium/lib cargo test --test translator -- --nocapture

use async_trait::async_trait;
use chrono::NaiveDate;
use paperwork::{
    compose_quote, engine, translate_file, translate_pdf, translate_sync, FailedBlockPolicy,
    Language, PaperworkError, QuoteRequest, QuoteTemplate, ServiceError, StrategyKind,
    StrategyPreference, TranslationConfig, TranslationRequest, TranslationService,
};
use pdfium_render::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

macro_rules! skip_without_pdfium {
    () => {
        if !engine::is_available() {
            println!("SKIP — pdfium library not found (set PDFIUM_LIB_PATH)");
            return;
        }
    };
}

// ── Test services ────────────────────────────────────────────────────────────

/// Upper-cases text and remembers the requested languages.
#[derive(Default)]
struct ShoutingService {
    calls: AtomicUsize,
    targets: Mutex<Vec<Language>>,
}

#[async_trait]
impl TranslationService for ShoutingService {
    fn name(&self) -> &str {
        "shouting"
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target);
        Ok(text.to_uppercase())
    }
}

/// Every request fails as if the service were down.
struct DownService;

#[async_trait]
impl TranslationService for DownService {
    fn name(&self) -> &str {
        "down"
    }

    async fn translate(&self, _text: &str, _target: Language) -> Result<String, ServiceError> {
        Err(ServiceError::Status { status: 503 })
    }
}

/// Returns the text unchanged, like translating into the source language.
struct EchoService;

#[async_trait]
impl TranslationService for EchoService {
    fn name(&self) -> &str {
        "echo"
    }

    async fn translate(&self, text: &str, _target: Language) -> Result<String, ServiceError> {
        Ok(text.to_string())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn source_pdf() -> Vec<u8> {
    let request = QuoteRequest {
        client_name: "Ana Souza".into(),
        address: "Rua das Flores, 10".into(),
        service_description: "Demolicao de muro".into(),
        agreed_value: 900.0,
        issued_on: NaiveDate::from_ymd_opt(2024, 3, 5),
        ..Default::default()
    };
    compose_quote(&request, &QuoteTemplate::default())
        .expect("compose fixture")
        .into_bytes()
}

/// The quote fixture followed by a page with no text at all.
fn source_with_blank_page() -> Vec<u8> {
    let pdfium = engine::bind().unwrap();
    let bytes = source_pdf();
    let mut doc = pdfium.load_pdf_from_byte_slice(&bytes, None).unwrap();
    doc.pages_mut()
        .create_page_at_end(PdfPagePaperSize::a4())
        .unwrap();
    doc.save_to_bytes().unwrap()
}

fn config_with(service: Arc<dyn TranslationService>, preference: StrategyPreference) -> TranslationConfig {
    TranslationConfig::builder()
        .service(service)
        .preference(preference)
        .build()
        .unwrap()
}

fn all_text(bytes: &[u8]) -> String {
    let pdfium = engine::bind().unwrap();
    let doc = pdfium.load_pdf_from_byte_slice(bytes, None).unwrap();
    doc.pages()
        .iter()
        .map(|page| page.text().map(|t| t.all()).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn overlay_keeps_page_count_and_adds_translations() {
    skip_without_pdfium!();

    let service = Arc::new(ShoutingService::default());
    let request = TranslationRequest::new("orcamento.pdf", source_pdf(), Language::English);
    let output = translate_pdf(&request, &config_with(service.clone(), StrategyPreference::Overlay))
        .await
        .expect("translate");

    assert_eq!(output.strategy, StrategyKind::Overlay);
    assert!(!output.fallback_used);
    assert!(output.warnings.is_empty());
    assert!(output.document.as_bytes().starts_with(b"%PDF-"));
    assert_eq!(output.document.page_count(), 1);
    assert!(output.stats.total_units > 0);
    assert_eq!(output.stats.translated_units, output.stats.total_units);
    assert_eq!(service.calls.load(Ordering::SeqCst), output.stats.total_units);
    assert!(service
        .targets
        .lock()
        .unwrap()
        .iter()
        .all(|t| *t == Language::English));

    let text = all_text(output.document.as_bytes());
    assert!(text.contains("SOUZA"), "{text}");
}

#[tokio::test]
async fn blank_page_survives_overlay() {
    skip_without_pdfium!();

    let request = TranslationRequest::new("a.pdf", source_with_blank_page(), Language::Spanish);
    let output = translate_pdf(
        &request,
        &config_with(Arc::new(ShoutingService::default()), StrategyPreference::Overlay),
    )
    .await
    .expect("translate");
    assert_eq!(output.structure.page_count, 2);
    assert_eq!(output.document.page_count(), 2);
}

#[tokio::test]
async fn conversion_reflows_translated_text() {
    skip_without_pdfium!();

    let request = TranslationRequest::new("a.pdf", source_pdf(), Language::German);
    let output = translate_pdf(
        &request,
        &config_with(Arc::new(ShoutingService::default()), StrategyPreference::Conversion),
    )
    .await
    .expect("translate");

    assert_eq!(output.strategy, StrategyKind::Conversion);
    assert!(output.document.page_count() >= 1);
    let text = all_text(output.document.as_bytes());
    assert!(text.contains("SOUZA"), "{text}");
    assert!(!text.contains("Souza"), "untranslated text leaked:\n{text}");
}

#[tokio::test]
async fn service_outage_still_yields_a_pdf_with_warnings() {
    skip_without_pdfium!();

    let request = TranslationRequest::new("a.pdf", source_pdf(), Language::French);
    let output = translate_pdf(
        &request,
        &config_with(Arc::new(DownService), StrategyPreference::Overlay),
    )
    .await
    .expect("a failed unit never fails the request");

    assert!(output.document.as_bytes().starts_with(b"%PDF-"));
    assert_eq!(output.stats.translated_units, 0);
    assert_eq!(output.warnings.len(), output.stats.total_units);
    assert!(output.warnings[0].to_string().contains("503"));

    // Original text is kept where translation failed.
    let text = all_text(output.document.as_bytes());
    assert!(text.contains("Ana Souza"));
}

#[tokio::test]
async fn blank_policy_with_outage_still_renders() {
    skip_without_pdfium!();

    let config = TranslationConfig::builder()
        .service(Arc::new(DownService))
        .preference(StrategyPreference::Overlay)
        .failed_blocks(FailedBlockPolicy::Blank)
        .build()
        .unwrap();
    let request = TranslationRequest::new("a.pdf", source_pdf(), Language::Italian);
    let output = translate_pdf(&request, &config).await.expect("translate");
    assert_eq!(output.document.page_count(), 1);
    assert_eq!(output.stats.failed_units, output.stats.total_units);
}

#[test]
fn same_language_translation_is_accepted() {
    skip_without_pdfium!();

    let request = TranslationRequest::new("a.pdf", source_pdf(), Language::Portuguese);
    let output = translate_sync(
        &request,
        &config_with(Arc::new(EchoService), StrategyPreference::Auto),
    )
    .expect("translate");
    assert!(output.warnings.is_empty());
    assert!(all_text(output.document.as_bytes()).contains("Ana Souza"));
}

#[tokio::test]
async fn translate_file_writes_prefixed_output_next_to_input() {
    skip_without_pdfium!();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("contrato.pdf");
    std::fs::write(&input, source_pdf()).unwrap();

    let config = config_with(Arc::new(ShoutingService::default()), StrategyPreference::Auto);
    let (output, path) = translate_file(&input, None, Language::English, &config)
        .await
        .expect("translate");

    assert_eq!(path, dir.path().join("traduzido_contrato.pdf"));
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written.len(), output.document.len());
    assert!(written.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn corrupt_pdf_is_reported() {
    skip_without_pdfium!();

    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.extend(std::iter::repeat(b'x').take(256));
    let request = TranslationRequest::new("broken.pdf", bytes, Language::English);
    let err = translate_pdf(
        &request,
        &config_with(Arc::new(EchoService), StrategyPreference::Auto),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PaperworkError::CorruptPdf { .. }), "{err}");
}

#[tokio::test]
async fn missing_input_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = translate_file(
        dir.path().join("nope.pdf"),
        None,
        Language::English,
        &TranslationConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PaperworkError::InputReadFailed { .. }), "{err}");
}
