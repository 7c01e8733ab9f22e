//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is a lazily-initialized singleton (`OnceLock`) holding the
//! metadata the language switcher and the fallback rules need.

use crate::i18n::{Language, Locale};
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub language: Language,

    /// Internal content code (e.g., "ka")
    pub code: &'static str,

    /// URL locale serving this language (e.g., "ge")
    pub url_locale: Locale,

    /// English name of the language (e.g., "Georgian")
    pub name: &'static str,

    /// Native name, shown in the language switcher (e.g., "ქართული")
    pub native_name: &'static str,

    /// ISO 3166 country code for the switcher flag
    pub country_code: &'static str,

    /// Whether localized lookups fall back to this language (exactly one)
    pub is_fallback: bool,

    /// Whether this is the site default (exactly one)
    pub is_default: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get the configuration of a language.
    pub fn config_for(&self, language: Language) -> &LanguageConfig {
        &self.languages[slot(language)]
    }

    /// Look a language up by its internal code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Look a language up by its URL locale segment.
    pub fn get_by_locale(&self, segment: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.url_locale.as_str() == segment)
    }

    /// All languages in switcher order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// The fallback language configuration.
    ///
    /// # Panics
    /// Panics if the table does not define exactly one fallback language.
    pub fn fallback(&self) -> &LanguageConfig {
        single(&self.languages, |lang| lang.is_fallback, "fallback")
    }

    /// The default language configuration.
    ///
    /// # Panics
    /// Panics if the table does not define exactly one default language.
    pub fn default_language(&self) -> &LanguageConfig {
        single(&self.languages, |lang| lang.is_default, "default")
    }
}

fn single<'a>(
    languages: &'a [LanguageConfig],
    predicate: impl Fn(&LanguageConfig) -> bool,
    what: &str,
) -> &'a LanguageConfig {
    let matching: Vec<_> = languages.iter().filter(|lang| predicate(lang)).collect();

    match matching.len() {
        0 => panic!("No {} language found in registry", what),
        1 => matching[0],
        _ => panic!("Multiple {} languages found in registry", what),
    }
}

// Position of each language in `default_languages`.
fn slot(language: Language) -> usize {
    match language {
        Language::Georgian => 0,
        Language::Russian => 1,
        Language::English => 2,
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            language: Language::Georgian,
            code: "ka",
            url_locale: Locale::Ge,
            name: "Georgian",
            native_name: "ქართული",
            country_code: "GE",
            is_fallback: false,
            is_default: true,
        },
        LanguageConfig {
            language: Language::Russian,
            code: "ru",
            url_locale: Locale::Ru,
            name: "Russian",
            native_name: "Русский",
            country_code: "RU",
            is_fallback: false,
            is_default: false,
        },
        LanguageConfig {
            language: Language::English,
            code: "en",
            url_locale: Locale::En,
            name: "English",
            native_name: "English",
            country_code: "US",
            is_fallback: true,
            is_default: false,
        },
    ]
}
