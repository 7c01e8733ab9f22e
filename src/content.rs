//! Localized content resolution over the admin-editable content tree.
//!
//! The tree is the free-form `site_content` JSON stored in the single
//! `site_settings` row. Paths are dotted (`about.values.0.title`); segments
//! index objects by key and arrays by position.
//!
//! Lookups never fail: a missing path or a missing translation resolves to an
//! empty string, and callers supply the final static default through
//! [`ContentTree::text_or`].

use crate::i18n::Language;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A display string in each supported language. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ka: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
}

impl LocalizedField {
    pub fn new(ka: &str, ru: &str, en: &str) -> Self {
        Self {
            ka: Some(ka.to_string()),
            ru: Some(ru.to_string()),
            en: Some(en.to_string()),
        }
    }

    /// A field with every language present but empty, as new editor rows start.
    pub fn blank() -> Self {
        Self::new("", "", "")
    }

    pub fn get(&self, language: Language) -> Option<&str> {
        match language {
            Language::Georgian => self.ka.as_deref(),
            Language::Russian => self.ru.as_deref(),
            Language::English => self.en.as_deref(),
        }
    }

    /// Requested language if non-empty, else English if non-empty, else "".
    pub fn resolve(&self, language: Language) -> &str {
        non_empty(self.get(language))
            .or_else(|| non_empty(self.get(Language::fallback())))
            .unwrap_or("")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("content path is empty")]
    EmptyPath,

    #[error("cannot descend into '{segment}' of '{path}': not an object or array")]
    NotAContainer { path: String, segment: String },

    #[error("index '{segment}' is out of range in '{path}'")]
    IndexOutOfRange { path: String, segment: String },
}

/// Follow a dotted path through objects and arrays.
pub fn walk<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(tree, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Resolve an already-located value for a language.
///
/// Plain strings are returned as-is (image URLs and other unlocalized
/// fields); language mappings apply the English fallback; anything else is "".
pub fn resolve_value(value: &Value, language: Language) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let pick = |lang: Language| {
                map.get(lang.code())
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            };
            pick(language)
                .or_else(|| pick(Language::fallback()))
                .unwrap_or("")
                .to_string()
        }
        _ => String::new(),
    }
}

/// Resolve the display string at `path` for `language`.
pub fn resolve_field(tree: &Value, path: &str, language: Language) -> String {
    walk(tree, path)
        .map(|value| resolve_value(value, language))
        .unwrap_or_default()
}

/// The array at `path`, or an empty vector if absent or not an array.
pub fn resolve_array(tree: &Value, path: &str) -> Vec<Value> {
    match walk(tree, path) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Write `value` at `path`, creating missing intermediate objects.
///
/// A numeric segment must name an existing array element.
pub fn set_at(tree: &mut Value, path: &str, value: Value) -> Result<(), ContentError> {
    if path.is_empty() {
        return Err(ContentError::EmptyPath);
    }

    if tree.is_null() {
        *tree = Value::Object(Map::new());
    }

    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = segments
        .split_last()
        .ok_or(ContentError::EmptyPath)?;

    let mut node = tree;
    for segment in parents {
        node = child_mut(node, path, segment)?;
    }

    match node {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let slot = array_slot(items, path, last)?;
            *slot = value;
            Ok(())
        }
        _ => Err(not_a_container(path, last)),
    }
}

fn child_mut<'a>(
    node: &'a mut Value,
    path: &str,
    segment: &str,
) -> Result<&'a mut Value, ContentError> {
    match node {
        Value::Object(map) => {
            let missing = map.get(segment).map_or(true, Value::is_null);
            // Numeric segments only index existing array elements
            if missing && segment.parse::<usize>().is_ok() {
                return Err(ContentError::IndexOutOfRange {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
            let child = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if child.is_null() {
                *child = Value::Object(Map::new());
            }
            Ok(child)
        }
        Value::Array(items) => array_slot(items, path, segment),
        _ => Err(not_a_container(path, segment)),
    }
}

fn array_slot<'a>(
    items: &'a mut [Value],
    path: &str,
    segment: &str,
) -> Result<&'a mut Value, ContentError> {
    segment
        .parse::<usize>()
        .ok()
        .and_then(|i| items.get_mut(i))
        .ok_or_else(|| ContentError::IndexOutOfRange {
            path: path.to_string(),
            segment: segment.to_string(),
        })
}

fn not_a_container(path: &str, segment: &str) -> ContentError {
    ContentError::NotAContainer {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

/// The site content tree with the resolver operations bound to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTree(Value);

impl Default for ContentTree {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl ContentTree {
    /// Wrap a raw value; `null` is treated as an empty tree.
    pub fn new(value: Value) -> Self {
        if value.is_null() {
            Self(Value::Object(Map::new()))
        } else {
            Self(value)
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn text(&self, path: &str, language: Language) -> String {
        resolve_field(&self.0, path, language)
    }

    /// Tree value, or `default` when the tree resolves to an empty string.
    pub fn text_or(&self, path: &str, language: Language, default: &str) -> String {
        let text = self.text(path, language);
        if text.is_empty() {
            default.to_string()
        } else {
            text
        }
    }

    pub fn array(&self, path: &str) -> Vec<Value> {
        resolve_array(&self.0, path)
    }

    /// Decode the array at `path` into typed items, skipping malformed entries.
    pub fn items<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        self.array(path)
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }

    /// Typed items at `path`, or `defaults` when the tree holds none.
    pub fn items_or<T: DeserializeOwned>(&self, path: &str, defaults: Vec<T>) -> Vec<T> {
        let items = self.items(path);
        if items.is_empty() {
            defaults
        } else {
            items
        }
    }

    pub fn set(&mut self, path: &str, value: Value) -> Result<(), ContentError> {
        set_at(&mut self.0, path, value)
    }
}
