//! Repeatable content blocks stored inside the content tree.
//!
//! Each block lives in an array under a known path (for example
//! `about.values`) and carries a stable string id so editors can reorder
//! entries without losing track of them.

use crate::content::LocalizedField;
use crate::list_editor::new_item_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content tree paths holding block arrays, with their item caps.
pub const BLOCK_PATHS: [(&str, Option<usize>); 5] = [
    ("home.serviceCards", None),
    ("home.whyUsItems", None),
    ("services.items", None),
    ("about.values", None),
    ("about.stats", Some(4)),
];

/// Whether `path` names an editable block array, and its item cap.
pub fn block_limit(path: &str) -> Option<Option<usize>> {
    BLOCK_PATHS
        .iter()
        .find(|(block_path, _)| *block_path == path)
        .map(|(_, limit)| *limit)
}

/// Like [`block_limit`], but also accepts the per-service nested lists
/// `services.items.{n}.features` and `services.items.{n}.images`.
pub fn list_limit(path: &str) -> Option<Option<usize>> {
    if let Some(limit) = block_limit(path) {
        return Some(limit);
    }
    let (index, field) = path.strip_prefix("services.items.")?.split_once('.')?;
    index.parse::<usize>().ok()?;
    matches!(field, "features" | "images").then_some(None)
}

/// The top-level block list a list path lives in:
/// `services.items.0.features` → `services.items`.
pub fn block_root(path: &str) -> &str {
    BLOCK_PATHS
        .iter()
        .map(|(block_path, _)| *block_path)
        .find(|block_path| {
            path.strip_prefix(block_path)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
        .unwrap_or(path)
}

/// Card with an icon, title and description. Used by the home page service
/// cards, the "why us" list and the about-page values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconCard {
    pub id: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub title: LocalizedField,
    #[serde(default)]
    pub description: LocalizedField,
}

impl IconCard {
    pub fn blank() -> Self {
        Self {
            id: new_item_id(),
            icon: "star".to_string(),
            title: LocalizedField::blank(),
            description: LocalizedField::blank(),
        }
    }
}

pub type ServiceCardItem = IconCard;
pub type WhyUsItem = IconCard;
pub type ValueItem = IconCard;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    pub id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: LocalizedField,
}

impl StatItem {
    pub fn blank() -> Self {
        Self {
            id: new_item_id(),
            value: String::new(),
            label: LocalizedField::blank(),
        }
    }
}

/// One checkmark line inside a service block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureItem {
    pub id: String,
    #[serde(default)]
    pub text: LocalizedField,
}

impl FeatureItem {
    pub fn blank() -> Self {
        Self {
            id: new_item_id(),
            text: LocalizedField::blank(),
        }
    }
}

/// A service block on the services page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub title: LocalizedField,
    #[serde(default)]
    pub description: LocalizedField,
    #[serde(default)]
    pub features: Vec<FeatureItem>,
}

/// Give a raw block item an id if it lacks a non-empty one.
pub fn with_fresh_id(mut item: Value) -> Value {
    if let Value::Object(map) = &mut item {
        let has_id = map
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            map.insert("id".to_string(), Value::String(new_item_id()));
        }
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_limit() {
        assert_eq!(block_limit("about.stats"), Some(Some(4)));
        assert_eq!(block_limit("services.items"), Some(None));
        assert_eq!(block_limit("home.heroTitle"), None);
    }

    #[test]
    fn test_list_limit_nested_service_lists() {
        assert_eq!(list_limit("about.stats"), Some(Some(4)));
        assert_eq!(list_limit("services.items.0.features"), Some(None));
        assert_eq!(list_limit("services.items.12.images"), Some(None));
        assert_eq!(list_limit("services.items.x.features"), None);
        assert_eq!(list_limit("services.items.0.title"), None);
        assert_eq!(list_limit("about.values.0.features"), None);
    }

    #[test]
    fn test_block_root() {
        assert_eq!(block_root("services.items.0.features"), "services.items");
        assert_eq!(block_root("services.items"), "services.items");
        assert_eq!(block_root("about.stats"), "about.stats");
        assert_eq!(block_root("about.statsExtra"), "about.statsExtra");
    }

    #[test]
    fn test_with_fresh_id_assigns_missing() {
        let item = with_fresh_id(json!({ "value": "20+" }));
        let id = item["id"].as_str().unwrap();
        assert!(!id.is_empty());
    }

    #[test]
    fn test_with_fresh_id_replaces_empty() {
        let item = with_fresh_id(json!({ "id": "", "value": "20+" }));
        assert_ne!(item["id"], json!(""));
    }

    #[test]
    fn test_with_fresh_id_keeps_existing() {
        let item = with_fresh_id(json!({ "id": "keep", "value": "20+" }));
        assert_eq!(item["id"], json!("keep"));
    }

    #[test]
    fn test_service_item_tolerates_missing_fields() {
        let item: ServiceItem = serde_json::from_value(json!({
            "id": "tours",
            "title": { "en": "Tours" },
            "features": [ { "id": "f1", "text": { "en": "VIP" } } ]
        }))
        .unwrap();

        assert!(item.images.is_empty());
        assert_eq!(item.features.len(), 1);
        assert_eq!(item.description, LocalizedField::default());
    }

    #[test]
    fn test_blank_items_have_distinct_ids() {
        assert_ne!(IconCard::blank().id, IconCard::blank().id);
        assert_ne!(StatItem::blank().id, StatItem::blank().id);
        assert_ne!(FeatureItem::blank().id, FeatureItem::blank().id);
    }
}
