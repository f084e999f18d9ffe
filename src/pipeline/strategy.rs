//! The strategy seam shared by block overlay and document conversion.
//!
//! A strategy receives a [`TranslationJob`] (source bytes, the page scans
//! made once by the analyzer, the target language and the service) and either
//! produces a complete PDF or aborts with a fatal error the selector can
//! recover from by trying the other strategy.

use super::extract::PageScan;
use super::service::TranslationService;
use crate::config::TranslationConfig;
use crate::error::{PaperworkError, UnitError};
use crate::language::Language;
use crate::output::{RenderedDocument, StrategyKind, TranslationUnit, UnitOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a strategy needs. Cheap to clone.
#[derive(Clone)]
pub struct TranslationJob {
    pub pdf: Arc<[u8]>,
    pub pages: Arc<[PageScan]>,
    pub target: Language,
    pub service: Arc<dyn TranslationService>,
    pub config: TranslationConfig,
}

/// A finished strategy run.
#[derive(Debug)]
pub struct StrategyOutput {
    pub document: RenderedDocument,
    /// One outcome per unit, in translation order.
    pub outcomes: Vec<UnitOutcome>,
}

impl StrategyOutput {
    pub fn warnings(&self) -> Vec<UnitError> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().cloned())
            .collect()
    }
}

/// One way of producing a translated PDF.
#[async_trait]
pub trait TranslationStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn run(&self, job: &TranslationJob) -> Result<StrategyOutput, PaperworkError>;
}

/// Translate `units` one after another.
///
/// A failed call never aborts the run: it becomes a [`UnitError`] in the
/// returned outcome and the next unit is attempted.
pub async fn translate_units(
    kind: StrategyKind,
    units: Vec<TranslationUnit>,
    job: &TranslationJob,
) -> Vec<UnitOutcome> {
    let total = units.len();
    if let Some(ref cb) = job.config.progress_callback {
        cb.on_strategy_start(kind, total);
    }

    let mut outcomes = Vec::with_capacity(total);
    for unit in units {
        let result = match job.service.translate(&unit.text, job.target).await {
            Ok(text) => {
                debug!("{}: page {} unit {}/{} translated", kind, unit.page, unit.index, total);
                if let Some(ref cb) = job.config.progress_callback {
                    cb.on_unit_complete(unit.page, unit.index, total);
                }
                Ok(text)
            }
            Err(e) => {
                let detail = e.to_string();
                warn!("{}: page {} unit {} skipped: {}", kind, unit.page, unit.index, detail);
                if let Some(ref cb) = job.config.progress_callback {
                    cb.on_unit_error(unit.page, unit.index, total, &detail);
                }
                Err(UnitError::TranslationFailed {
                    page: unit.page,
                    unit: unit.index,
                    detail,
                })
            }
        };
        outcomes.push(UnitOutcome { unit, result });
    }
    outcomes
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted translation services shared by the strategy tests.

    use super::*;
    use crate::error::ServiceError;
    use std::sync::Mutex;

    /// Upper-cases text; fails for any text containing `fail_on`.
    #[derive(Default)]
    pub struct ScriptedService {
        pub fail_on: Option<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        pub fn failing_on(needle: &str) -> Self {
            Self {
                fail_on: Some(needle.to_string()),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TranslationService for ScriptedService {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn translate(&self, text: &str, _target: Language) -> Result<String, ServiceError> {
            self.calls.lock().unwrap().push(text.to_string());
            match &self.fail_on {
                Some(needle) if text.contains(needle.as_str()) => {
                    Err(ServiceError::Status { status: 503 })
                }
                _ => Ok(text.to_uppercase()),
            }
        }
    }

    pub fn job(service: Arc<dyn TranslationService>, pages: Vec<PageScan>) -> TranslationJob {
        TranslationJob {
            pdf: Arc::from(&b"%PDF-1.7"[..]),
            pages: pages.into(),
            target: Language::English,
            service,
            config: TranslationConfig::default(),
        }
    }
}
