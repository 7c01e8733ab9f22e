//! Posts: offers, promotions and news items shown on the public site.

use crate::i18n::Language;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    #[default]
    Offer,
    Promotion,
    News,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Offer => "offer",
            PostCategory::Promotion => "promotion",
            PostCategory::News => "news",
        }
    }
}

impl fmt::Display for PostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page section a post may appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayLocation {
    OffersPage,
    HomeLatest,
}

impl DisplayLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayLocation::OffersPage => "offers_page",
            DisplayLocation::HomeLatest => "home_latest",
        }
    }
}

fn default_display_locations() -> Vec<DisplayLocation> {
    vec![DisplayLocation::OffersPage]
}

/// Tabs on the offers page, each showing one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferTab {
    Offers,
    Promotions,
    News,
}

impl OfferTab {
    pub const ALL: [OfferTab; 3] = [OfferTab::Offers, OfferTab::Promotions, OfferTab::News];

    /// Parse a `?tab=` value; anything unknown shows offers.
    pub fn from_param(param: Option<&str>) -> OfferTab {
        match param {
            Some("promotions") => OfferTab::Promotions,
            Some("news") => OfferTab::News,
            _ => OfferTab::Offers,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferTab::Offers => "offers",
            OfferTab::Promotions => "promotions",
            OfferTab::News => "news",
        }
    }

    pub fn category(&self) -> PostCategory {
        match self {
            OfferTab::Offers => PostCategory::Offer,
            OfferTab::Promotions => PostCategory::Promotion,
            OfferTab::News => PostCategory::News,
        }
    }

    /// UI catalog key for the tab label.
    pub fn label_key(&self) -> String {
        format!("offers.tabs.{}", self.as_str())
    }
}

/// Localizable text columns of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    Title,
    Excerpt,
    Content,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub category: PostCategory,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gallery: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title_ka: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title_ru: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title_en: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt_ka: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt_ru: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt_en: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_ka: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_ru: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_en: String,
    #[serde(
        default = "default_display_locations",
        deserialize_with = "display_locations_or_default"
    )]
    pub display_locations: Vec<DisplayLocation>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinned: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Localized text: requested language, else English, else empty.
    pub fn localized(&self, field: PostField, language: Language) -> &str {
        let (ka, ru, en) = match field {
            PostField::Title => (&self.title_ka, &self.title_ru, &self.title_en),
            PostField::Excerpt => (&self.excerpt_ka, &self.excerpt_ru, &self.excerpt_en),
            PostField::Content => (&self.content_ka, &self.content_ru, &self.content_en),
        };
        let requested = match language {
            Language::Georgian => ka,
            Language::Russian => ru,
            Language::English => en,
        };

        if !requested.is_empty() {
            requested
        } else {
            en
        }
    }

    pub fn title(&self, language: Language) -> &str {
        self.localized(PostField::Title, language)
    }

    /// Case-insensitive match of `query` against the localized title.
    pub fn title_matches(&self, query: &str, language: Language) -> bool {
        self.title(language)
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn display_locations_or_default<'de, D>(deserializer: D) -> Result<Vec<DisplayLocation>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<DisplayLocation>>::deserialize(deserializer)?
        .unwrap_or_else(default_display_locations))
}

/// Keep posts whose localized title contains `query`. An empty or blank
/// query keeps everything.
pub fn search_by_title(posts: Vec<Post>, query: Option<&str>, language: Language) -> Vec<Post> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => posts
            .into_iter()
            .filter(|post| post.title_matches(query, language))
            .collect(),
        None => posts,
    }
}

fn slug_patterns() -> &'static (Regex, Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"[^A-Za-z0-9_\s-]").unwrap(),
            Regex::new(r"\s+").unwrap(),
            Regex::new(r"-+").unwrap(),
        )
    })
}

/// URL slug from a title: `"Summer in Batumi!"` → `"summer-in-batumi"`.
///
/// Only ASCII word characters survive, so a title written purely in
/// Georgian or Cyrillic yields an empty slug.
pub fn generate_slug(title: &str) -> String {
    let (invalid, whitespace, hyphens) = slug_patterns();

    let lower = title.trim().to_lowercase();
    let cleaned = invalid.replace_all(&lower, "");
    let hyphenated = whitespace.replace_all(&cleaned, "-");
    let collapsed = hyphens.replace_all(&hyphenated, "-");

    collapsed.trim_matches('-').to_string()
}

/// Editable post fields as submitted by the admin editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: PostCategory,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub title_ka: String,
    #[serde(default)]
    pub title_ru: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub excerpt_ka: String,
    #[serde(default)]
    pub excerpt_ru: String,
    #[serde(default)]
    pub excerpt_en: String,
    #[serde(default)]
    pub content_ka: String,
    #[serde(default)]
    pub content_ru: String,
    #[serde(default)]
    pub content_en: String,
    #[serde(default = "default_display_locations")]
    pub display_locations: Vec<DisplayLocation>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl PostDraft {
    /// Normalize and check the draft before it is written.
    ///
    /// New posts without a slug get one generated from the English title.
    /// Gallery URLs are trimmed and blank entries dropped; an empty cover
    /// URL is stored as null.
    pub fn prepare(mut self, is_new: bool) -> Result<Self, String> {
        self.slug = self.slug.trim().to_string();
        if is_new && self.slug.is_empty() {
            self.slug = generate_slug(&self.title_en);
        }

        self.gallery = self
            .gallery
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        self.cover_image_url = self
            .cover_image_url
            .take()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.slug.trim().is_empty() {
            return Err("Slug is required".to_string());
        }
        if self.title_en.trim().is_empty() {
            return Err("English title is required".to_string());
        }
        Ok(())
    }
}

/// Filters for reading published posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub category: Option<PostCategory>,
    pub display_location: Option<DisplayLocation>,
    pub limit: Option<usize>,
}

/// Public ordering: pinned first, then manual order, newest last resort.
pub const PUBLIC_ORDER: &str = "pinned.desc,sort_order.asc.nullslast,created_at.desc";

/// Admin listing ordering.
pub const ADMIN_ORDER: &str = "updated_at.desc";

impl PostQuery {
    /// Published posts of one category, as listed on the offers page.
    pub fn for_tab(tab: OfferTab) -> Self {
        Self {
            category: Some(tab.category()),
            display_location: Some(DisplayLocation::OffersPage),
            limit: None,
        }
    }

    /// Posts flagged for the home page "latest offers" strip.
    pub fn home_latest(limit: usize) -> Self {
        Self {
            category: None,
            display_location: Some(DisplayLocation::HomeLatest),
            limit: Some(limit),
        }
    }

    /// PostgREST query parameters, in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("is_published", "eq.true".to_string()),
        ];
        if let Some(location) = self.display_location {
            params.push(("display_locations", format!("cs.{{{}}}", location.as_str())));
        }
        if let Some(category) = self.category {
            params.push(("category", format!("eq.{}", category)));
        }
        params.push(("order", PUBLIC_ORDER.to_string()));
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}
