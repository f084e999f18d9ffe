//! Target languages offered by the translator.
//!
//! The set is fixed: six languages, each mapped to the two-letter code the
//! translation service expects. The source language is never chosen by the
//! caller; the service auto-detects it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported translation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Portuguese,
    English,
    Spanish,
    French,
    German,
    Italian,
}

impl Language {
    /// Every supported language, in menu order.
    pub const ALL: [Language; 6] = [
        Language::Portuguese,
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
    ];

    /// Two-letter code sent to the translation service.
    pub fn code(self) -> &'static str {
        match self {
            Language::Portuguese => "pt",
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
        }
    }

    /// Menu label, in Portuguese.
    pub fn label(self) -> &'static str {
        match self {
            Language::Portuguese => "Português",
            Language::English => "Inglês",
            Language::Spanish => "Espanhol",
            Language::French => "Francês",
            Language::German => "Alemão",
            Language::Italian => "Italiano",
        }
    }

    fn english_name(self) -> &'static str {
        match self {
            Language::Portuguese => "portuguese",
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::German => "german",
            Language::Italian => "italian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

/// Error returned when a string names no supported language.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}' (expected one of: pt, en, es, fr, de, it)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Accepts the code, the English name or the Portuguese label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| {
                needle == lang.code()
                    || needle == lang.english_name()
                    || needle == lang.label().to_lowercase()
            })
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
