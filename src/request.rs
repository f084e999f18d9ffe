//! Request value objects handed over by a form shell.
//!
//! A shell (the bundled CLIs, a web form, a test) collects user input into a
//! [`QuoteRequest`] or [`TranslationRequest`] and passes it to the library.
//! Nothing here outlives a single call.

use crate::error::PaperworkError;
use crate::language::Language;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Remove characters that are not allowed in file names on common platforms.
pub fn clean_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "").into_owned()
}

/// Form fields of a quote, plus the optional images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteRequest {
    pub client_name: String,
    pub phone: String,
    pub address: String,
    pub deadline: String,
    pub service_description: String,
    pub payment_terms: String,
    /// Agreed value in the template's currency.
    pub agreed_value: f64,
    pub note: String,
    /// Raw JPEG or PNG bytes drawn in the top-left corner.
    pub logo: Option<Vec<u8>>,
    /// Raw JPEG or PNG bytes drawn centered above the title.
    pub header_image: Option<Vec<u8>>,
    /// Date printed on the quote. `None` = today, local time.
    pub issued_on: Option<NaiveDate>,
}

impl QuoteRequest {
    /// Reject the request before any rendering starts.
    pub fn validate(&self) -> Result<(), PaperworkError> {
        if self.client_name.trim().is_empty() {
            return Err(PaperworkError::MissingInput {
                field: "client name",
            });
        }
        if !self.agreed_value.is_finite() {
            return Err(PaperworkError::InvalidConfig(format!(
                "agreed value must be a finite number, got {}",
                self.agreed_value
            )));
        }
        Ok(())
    }

    /// Download name: `orcamento_<client-name>.pdf`.
    pub fn output_filename(&self) -> String {
        clean_filename(&format!("orcamento_{}.pdf", self.client_name))
    }
}

/// An uploaded PDF and the language to translate it into.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Name of the uploaded file, used to derive the output name.
    pub file_name: String,
    pub pdf: Vec<u8>,
    pub target: Language,
}

impl TranslationRequest {
    pub fn new(file_name: impl Into<String>, pdf: Vec<u8>, target: Language) -> Self {
        Self {
            file_name: file_name.into(),
            pdf,
            target,
        }
    }

    /// Reject an empty upload or a buffer that does not start with `%PDF`.
    pub fn validate(&self) -> Result<(), PaperworkError> {
        if self.pdf.is_empty() {
            return Err(PaperworkError::MissingInput { field: "PDF file" });
        }
        check_pdf_magic(&self.file_name, &self.pdf)
    }

    /// Download name: `traduzido_<original-filename>`.
    pub fn output_filename(&self) -> String {
        let base = std::path::Path::new(&self.file_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.clone());
        clean_filename(&format!("traduzido_{base}"))
    }
}

/// Verify the PDF magic bytes so callers get a meaningful error rather than
/// a pdfium parse failure.
pub(crate) fn check_pdf_magic(name: &str, bytes: &[u8]) -> Result<(), PaperworkError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(PaperworkError::NotAPdf {
            name: name.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_filename_strips_reserved_chars() {
        assert_eq!(clean_filename(r#"a<b>c:d"e/f\g|h?i*j.pdf"#), "abcdefghij.pdf");
        assert_eq!(clean_filename("relatório final.pdf"), "relatório final.pdf");
    }

    #[test]
    fn quote_requires_client_name() {
        let req = QuoteRequest {
            client_name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            req.validate(),
            Err(PaperworkError::MissingInput { field: "client name" })
        ));

        let req = QuoteRequest {
            client_name: "Ana".into(),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn quote_rejects_nan_value() {
        let req = QuoteRequest {
            client_name: "Ana".into(),
            agreed_value: f64::NAN,
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn quote_filename() {
        let req = QuoteRequest {
            client_name: "João Silva".into(),
            ..Default::default()
        };
        assert_eq!(req.output_filename(), "orcamento_João Silva.pdf");

        let req = QuoteRequest {
            client_name: "A/B".into(),
            ..Default::default()
        };
        assert_eq!(req.output_filename(), "orcamento_AB.pdf");
    }

    #[test]
    fn translation_request_validation() {
        let empty = TranslationRequest::new("x.pdf", vec![], Language::English);
        assert!(matches!(
            empty.validate(),
            Err(PaperworkError::MissingInput { .. })
        ));

        let png = TranslationRequest::new("x.pdf", b"\x89PNG....".to_vec(), Language::English);
        assert!(matches!(png.validate(), Err(PaperworkError::NotAPdf { .. })));

        let pdf = TranslationRequest::new("x.pdf", b"%PDF-1.4".to_vec(), Language::English);
        assert!(pdf.validate().is_ok());
    }

    #[test]
    fn translation_filename_uses_base_name() {
        let req = TranslationRequest::new("/tmp/in/contrato.pdf", vec![], Language::Spanish);
        assert_eq!(req.output_filename(), "traduzido_contrato.pdf");
    }
}
