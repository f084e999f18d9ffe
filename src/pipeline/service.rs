//! Translation service: the only stage with network I/O.
//!
//! Strategies talk to an `Arc<dyn TranslationService>`, so tests and
//! embedders can swap in their own implementation. The default,
//! [`GoogleTranslator`], calls the public `translate_a/single` endpoint.

use crate::config::TranslationConfig;
use crate::error::{PaperworkError, ServiceError};
use crate::language::Language;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Per-request character limit of the public endpoint.
pub const MAX_REQUEST_CHARS: usize = 5000;

/// Translates one piece of text into a target language.
///
/// The source language is always auto-detected.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target: Language) -> Result<String, ServiceError>;
}

/// Client for the public Google translate endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    /// `timeout` of `None` waits as long as the service takes.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, PaperworkError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| PaperworkError::InvalidConfig(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &TranslationConfig) -> Result<Self, PaperworkError> {
        Self::new(
            config.endpoint.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }
}

#[async_trait]
impl TranslationService for GoogleTranslator {
    fn name(&self) -> &str {
        "google-translate"
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String, ServiceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(text.to_string());
        }
        let len = trimmed.chars().count();
        if len > MAX_REQUEST_CHARS {
            return Err(ServiceError::InputTooLong {
                len,
                limit: MAX_REQUEST_CHARS,
            });
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", trimmed),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Transport(format!("timed out: {e}"))
                } else {
                    ServiceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let translated = parse_response(&body)?;
        debug!(
            "Translated {} chars → {} chars ({})",
            len,
            translated.chars().count(),
            target.code()
        );
        Ok(translated)
    }
}

/// Concatenate the translated segments of a `translate_a/single` reply.
///
/// The reply is a nested array; element `[0]` lists one entry per sentence
/// with the translation at index `[0]` of each entry.
pub fn parse_response(body: &str) -> Result<String, ServiceError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    let sentences = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ServiceError::MalformedResponse("missing sentence list".into()))?;

    Ok(sentences
        .iter()
        .filter_map(|s| s.get(0).and_then(|t| t.as_str()))
        .collect())
}
