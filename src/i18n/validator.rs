//! Catalog completeness validation.
//!
//! English is the reference: every leaf key present in English must exist
//! (non-empty) in every other language. Keys that exist only in a translation
//! are reported as warnings since nothing falls back to them.

use crate::content::walk;
use crate::i18n::{Language, UiStrings};
use serde_json::Value;

/// Validation report containing errors and warnings about the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys missing from a translation
    pub errors: Vec<String>,

    /// Keys only present in a translation
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for UI catalog completeness.
pub struct CatalogValidator;

impl CatalogValidator {
    pub fn validate(strings: &UiStrings) -> ValidationReport {
        let mut report = ValidationReport::new();

        let reference = Language::fallback();
        let Some(reference_root) = strings.language_root(reference) else {
            report
                .errors
                .push(format!("Reference language '{}' is missing", reference));
            return report;
        };
        let reference_keys = leaf_keys(reference_root);

        for language in Language::ALL.into_iter().filter(|l| *l != reference) {
            let Some(root) = strings.language_root(language) else {
                report
                    .errors
                    .push(format!("Language '{}' is missing from the catalog", language));
                continue;
            };

            for key in &reference_keys {
                let present = walk(root, key)
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.is_empty());
                if !present {
                    report
                        .errors
                        .push(format!("[{}] missing translation for '{}'", language, key));
                }
            }

            for key in leaf_keys(root) {
                if !reference_keys.contains(&key) {
                    report
                        .warnings
                        .push(format!("[{}] '{}' has no {} counterpart", language, key, reference));
                }
            }
        }

        report
    }
}

/// Dotted paths of every string leaf, in document order.
fn leaf_keys(root: &Value) -> Vec<String> {
    let mut keys = Vec::new();
    collect_leaves(root, String::new(), &mut keys);
    keys
}

fn collect_leaves(node: &Value, prefix: String, keys: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (name, child) in map {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                collect_leaves(child, path, keys);
            }
        }
        Value::String(_) => keys.push(prefix),
        _ => {}
    }
}
