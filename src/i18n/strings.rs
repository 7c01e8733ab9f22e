//! Static UI strings (navigation labels, headings, default copy).
//!
//! The catalog is embedded at compile time from `assets/ui_strings.json`,
//! keyed by language code at the top level. These strings are the last
//! fallback for page text: the admin-edited content tree is consulted first.

use crate::content::walk;
use crate::i18n::Language;
use serde_json::Value;
use std::sync::OnceLock;

const CATALOG_JSON: &str = include_str!("../../assets/ui_strings.json");

/// Localized UI strings for every supported language.
#[derive(Debug, Clone)]
pub struct UiStrings {
    catalog: Value,
}

static UI_STRINGS: OnceLock<UiStrings> = OnceLock::new();

impl UiStrings {
    /// The embedded catalog.
    ///
    /// # Panics
    /// Panics if the embedded JSON is malformed, which the test suite rules out.
    pub fn global() -> &'static UiStrings {
        UI_STRINGS.get_or_init(|| {
            let catalog =
                serde_json::from_str(CATALOG_JSON).expect("embedded UI catalog should be valid JSON");
            UiStrings { catalog }
        })
    }

    /// Build a catalog from an arbitrary value (tests and validation).
    pub fn from_value(catalog: Value) -> Self {
        Self { catalog }
    }

    /// Root of one language's strings.
    pub fn language_root(&self, language: Language) -> Option<&Value> {
        self.catalog.get(language.code())
    }

    /// Look up a dotted key, falling back to English and then to the key itself.
    pub fn translate(&self, language: Language, key: &str) -> String {
        self.lookup(language, key)
            .or_else(|| self.lookup(Language::fallback(), key))
            .unwrap_or(key)
            .to_string()
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.language_root(language)
            .and_then(|root| walk(root, key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Shorthand for `UiStrings::global().translate(language, key)`.
pub fn t(language: Language, key: &str) -> String {
    UiStrings::global().translate(language, key)
}
