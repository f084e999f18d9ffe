//! Configuration types for quote composition and PDF translation.
//!
//! Business constants of the quote template (title, counter-party name,
//! agreement clauses) live in [`QuoteTemplate`] rather than in the layout
//! code, so a different company can reuse the composer with a JSON file.
//! Translation behaviour is controlled through [`TranslationConfig`], built via
//! its [`TranslationConfigBuilder`].

use crate::error::PaperworkError;
use crate::pipeline::service::TranslationService;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

// ── Quote template ───────────────────────────────────────────────────────

/// Static content and layout knobs of the quote page.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
///
/// # Example
/// ```rust
/// use paperwork::QuoteTemplate;
///
/// let template: QuoteTemplate =
///     serde_json::from_str(r#"{ "counterparty": "Maria Lima" }"#).unwrap();
/// assert_eq!(template.counterparty, "Maria Lima");
/// assert_eq!(template.wrap_columns, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteTemplate {
    /// Centered title, drawn below the banner image.
    pub title: String,

    /// Name printed on the second signature line.
    pub counterparty: String,

    /// Small print at the bottom of every page.
    pub footer: String,

    /// Prefix of the agreed value, e.g. `R$`.
    pub currency_symbol: String,

    /// Bold heading above the agreement clauses.
    pub terms_heading: String,

    /// Agreement clauses, each wrapped as its own paragraph.
    pub terms: Vec<String>,

    /// Wrap column for field lines and clauses. Default: 100.
    pub wrap_columns: usize,

    /// Distance between baselines, in centimetres. Default: 0.5.
    pub line_pitch_cm: f32,

    /// What happens when wrapped content runs past the bottom margin.
    pub overflow: OverflowPolicy,
}

impl Default for QuoteTemplate {
    fn default() -> Self {
        Self {
            title: "Orçamento de Demolição".to_string(),
            counterparty: "Herenildo Da Silva Souza".to_string(),
            footer: "Demolidora Genial - Documento gerado automaticamente".to_string(),
            currency_symbol: "R$".to_string(),
            terms_heading: "Termos de Acordo:".to_string(),
            terms: vec![
                "a) Serviços Prestados: O contratante concorda em realizar a demolição completa do imóvel conforme descrito na seção 1 deste documento.".to_string(),
                "b) Alterações no Escopo: Qualquer alteração no escopo dos serviços acordados deverá ser comunicada por escrito e pode resultar em ajustes no preço e no prazo de execução.".to_string(),
                "c) Pagamento: O cliente concorda em pagar o valor total estipulado neste orçamento de demolição, conforme descrito na seção VALOR, após a conclusão satisfatória dos serviços.".to_string(),
            ],
            wrap_columns: 100,
            line_pitch_cm: 0.5,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl QuoteTemplate {
    /// Load a template from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, PaperworkError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PaperworkError::InvalidConfig(format!("cannot read template {}: {e}", path.display()))
        })?;
        let template: Self = serde_json::from_str(&raw).map_err(|e| {
            PaperworkError::InvalidConfig(format!("template {} is not valid JSON: {e}", path.display()))
        })?;
        template.validate()?;
        Ok(template)
    }

    /// Reject values the layout cannot work with.
    pub fn validate(&self) -> Result<(), PaperworkError> {
        if self.wrap_columns == 0 {
            return Err(PaperworkError::InvalidConfig(
                "wrap_columns must be ≥ 1".into(),
            ));
        }
        if !(self.line_pitch_cm > 0.0 && self.line_pitch_cm <= 5.0) {
            return Err(PaperworkError::InvalidConfig(format!(
                "line_pitch_cm must be in (0, 5], got {}",
                self.line_pitch_cm
            )));
        }
        Ok(())
    }
}

/// Behaviour when the quote content does not fit on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Continue on a fresh A4 page, repeating the footer. (default)
    #[default]
    Paginate,
    /// Keep drawing below the bottom edge; the overflowing lines are lost.
    Clip,
}

// ── Translation config ───────────────────────────────────────────────────

/// Default endpoint of the public Google translate service.
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Configuration for a PDF translation.
///
/// Built via [`TranslationConfig::builder()`] or using
/// [`TranslationConfig::default()`].
///
/// # Example
/// ```rust
/// use paperwork::{FailedBlockPolicy, TranslationConfig};
///
/// let config = TranslationConfig::builder()
///     .font_size(9.0)
///     .failed_blocks(FailedBlockPolicy::Blank)
///     .build()
///     .unwrap();
/// assert_eq!(config.font_size, 9.0);
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Endpoint of the default translation service.
    pub endpoint: String,

    /// Per-request timeout in seconds. Default: none, a stalled service
    /// stalls the whole request.
    pub request_timeout_secs: Option<u64>,

    /// Font size of the overlaid translations, in points. Default: 10.
    pub font_size: f32,

    /// Font size used when reflowing the structured document. Default: 10.
    pub reflow_font_size: f32,

    /// What the overlay does with a block whose translation failed.
    pub failed_blocks: FailedBlockPolicy,

    /// Thresholds for choosing the first strategy.
    pub thresholds: AnalyzerThresholds,

    /// Which strategy to try first. Default: chosen by the analyzer.
    pub preference: StrategyPreference,

    /// Pre-constructed translation service. Takes precedence over `endpoint`.
    pub service: Option<Arc<dyn TranslationService>>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            request_timeout_secs: None,
            font_size: 10.0,
            reflow_font_size: 10.0,
            failed_blocks: FailedBlockPolicy::default(),
            thresholds: AnalyzerThresholds::default(),
            preference: StrategyPreference::default(),
            service: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("endpoint", &self.endpoint)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("font_size", &self.font_size)
            .field("reflow_font_size", &self.reflow_font_size)
            .field("failed_blocks", &self.failed_blocks)
            .field("thresholds", &self.thresholds)
            .field("preference", &self.preference)
            .field("service", &self.service.as_ref().map(|s| s.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn TranslationProgressCallback>"),
            )
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslationConfig`].
#[derive(Debug)]
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.config.font_size = size;
        self
    }

    pub fn reflow_font_size(mut self, size: f32) -> Self {
        self.config.reflow_font_size = size;
        self
    }

    pub fn failed_blocks(mut self, policy: FailedBlockPolicy) -> Self {
        self.config.failed_blocks = policy;
        self
    }

    pub fn thresholds(mut self, thresholds: AnalyzerThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    pub fn preference(mut self, preference: StrategyPreference) -> Self {
        self.config.preference = preference;
        self
    }

    pub fn service(mut self, service: Arc<dyn TranslationService>) -> Self {
        self.config.service = Some(service);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, PaperworkError> {
        let c = &self.config;
        for (name, size) in [("font_size", c.font_size), ("reflow_font_size", c.reflow_font_size)] {
            if !(4.0..=72.0).contains(&size) {
                return Err(PaperworkError::InvalidConfig(format!(
                    "{name} must be 4–72 pt, got {size}"
                )));
            }
        }
        if c.service.is_none() && !c.endpoint.starts_with("http") {
            return Err(PaperworkError::InvalidConfig(format!(
                "endpoint must be an HTTP(S) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(PaperworkError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What the overlay strategy draws for a block whose translation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailedBlockPolicy {
    /// Leave the block untouched; the original text stays visible. (default)
    #[default]
    KeepOriginal,
    /// Paint the white fill only; the block ends up blank.
    Blank,
}

/// Which translation strategy runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyPreference {
    /// Let the structure analyzer decide. (default)
    #[default]
    Auto,
    /// Block overlay first, conversion as fallback.
    Overlay,
    /// Document conversion first, overlay as fallback.
    Conversion,
}

/// Heuristic thresholds of the structure analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerThresholds {
    /// A page with more text blocks than this has a complex layout. Default: 20.
    pub complex_block_count: usize,
    /// Total `|` and tab characters at which the text looks tabular. Default: 10.
    pub table_marker_count: usize,
}

impl Default for AnalyzerThresholds {
    fn default() -> Self {
        Self {
            complex_block_count: 20,
            table_marker_count: 10,
        }
    }
}
