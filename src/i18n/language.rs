//! Language and URL locale types.
//!
//! The site exposes three URL locales (`ge`, `ru`, `en`) that map one-to-one to
//! the internal content languages (`ka`, `ru`, `en`). Only Georgian differs
//! between the two code sets.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A content language, used as the key inside localized fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ka")]
    Georgian,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Georgian, Language::Russian, Language::English];

    /// Parse an internal language code (`ka`, `ru`, `en`).
    ///
    /// # Example
    /// ```ignore
    /// let russian = Language::from_code("ru")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language> {
        match code {
            "ka" => Ok(Language::Georgian),
            "ru" => Ok(Language::Russian),
            "en" => Ok(Language::English),
            _ => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The language every localized lookup falls back to.
    pub fn fallback() -> Language {
        let config = LanguageRegistry::get().fallback();
        config.language
    }

    /// The language served when nothing else is known.
    pub fn default_language() -> Language {
        LanguageRegistry::get().default_language().language
    }

    /// Internal code used as a key in localized fields and `*_ka` columns.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Georgian => "ka",
            Language::Russian => "ru",
            Language::English => "en",
        }
    }

    /// URL locale that serves this language.
    pub fn locale(&self) -> Locale {
        match self {
            Language::Georgian => Locale::Ge,
            Language::Russian => Locale::Ru,
            Language::English => Locale::En,
        }
    }

    /// Full registry metadata for this language.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get().config_for(*self)
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_fallback(&self) -> bool {
        self.config().is_fallback
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A URL locale: the first segment of every public page path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ge,
    Ru,
    En,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Ge, Locale::Ru, Locale::En];

    /// Parse a path segment. Only exact, lowercase matches count as a locale.
    pub fn from_segment(segment: &str) -> Option<Locale> {
        match segment {
            "ge" => Some(Locale::Ge),
            "ru" => Some(Locale::Ru),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Locale used for redirects of unprefixed paths.
    pub fn default_locale() -> Locale {
        Language::default_language().locale()
    }

    /// Map an arbitrary URL locale string to a language, defaulting to Georgian.
    pub fn language_for(segment: &str) -> Language {
        Locale::from_segment(segment)
            .map(|locale| locale.language())
            .unwrap_or(Language::Georgian)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ge => "ge",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    pub fn language(&self) -> Language {
        match self {
            Locale::Ge => Language::Georgian,
            Locale::Ru => Language::Russian,
            Locale::En => Language::English,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
