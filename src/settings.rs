//! The single site settings row: company details, contacts and the
//! admin-editable content tree.

use crate::content::ContentTree;
use crate::i18n::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Localizable settings columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    CompanyName,
    Address,
    WorkingHours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name_ka: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name_ru: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name_en: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phones: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<String>,
    #[serde(default)]
    pub address_ka: Option<String>,
    #[serde(default)]
    pub address_ru: Option<String>,
    #[serde(default)]
    pub address_en: Option<String>,
    #[serde(default)]
    pub working_hours_ka: Option<String>,
    #[serde(default)]
    pub working_hours_ru: Option<String>,
    #[serde(default)]
    pub working_hours_en: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub map_embed_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "content_or_empty")]
    pub site_content: ContentTree,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SiteSettings {
    /// Localized column: requested language, else English, else empty.
    pub fn localized(&self, field: SettingsField, language: Language) -> &str {
        let (ka, ru, en) = match field {
            SettingsField::CompanyName => (
                Some(&self.company_name_ka),
                Some(&self.company_name_ru),
                Some(&self.company_name_en),
            ),
            SettingsField::Address => (
                self.address_ka.as_ref(),
                self.address_ru.as_ref(),
                self.address_en.as_ref(),
            ),
            SettingsField::WorkingHours => (
                self.working_hours_ka.as_ref(),
                self.working_hours_ru.as_ref(),
                self.working_hours_en.as_ref(),
            ),
        };
        let requested = match language {
            Language::Georgian => ka,
            Language::Russian => ru,
            Language::English => en,
        };

        requested
            .filter(|s| !s.is_empty())
            .or(en.filter(|s| !s.is_empty()))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Phone numbers to show: the list when set, else the single legacy phone.
    pub fn all_phones(&self) -> Vec<&str> {
        non_empty_or_single(&self.phones, self.phone.as_deref())
    }

    pub fn all_emails(&self) -> Vec<&str> {
        non_empty_or_single(&self.emails, self.email.as_deref())
    }

    /// Primary phone number: the first listed, else the legacy field.
    pub fn primary_phone(&self) -> Option<&str> {
        self.all_phones().into_iter().next()
    }

    /// WhatsApp number, falling back to the primary phone.
    pub fn whatsapp_number(&self) -> Option<&str> {
        self.whatsapp
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.primary_phone())
    }

    /// Social profile links that are set, as `(network, url)` pairs.
    pub fn social_links(&self) -> Vec<(&'static str, &str)> {
        [
            ("facebook", &self.facebook_url),
            ("instagram", &self.instagram_url),
            ("tiktok", &self.tiktok_url),
            ("youtube", &self.youtube_url),
        ]
        .into_iter()
        .filter_map(|(network, url)| {
            url.as_deref()
                .filter(|u| !u.is_empty())
                .map(|u| (network, u))
        })
        .collect()
    }
}

/// `wa.me` link for a phone number, keeping only its digits.
pub fn whatsapp_link(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{}", digits)
}

fn non_empty_or_single<'a>(list: &'a [String], single: Option<&'a str>) -> Vec<&'a str> {
    let listed: Vec<&str> = list
        .iter()
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .collect();
    if !listed.is_empty() {
        return listed;
    }
    single.filter(|s| !s.is_empty()).into_iter().collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn content_or_empty<'de, D>(deserializer: D) -> Result<ContentTree, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ContentTree::new(Value::deserialize(deserializer)?))
}

/// Columns an administrator may change. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name_ka: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name_ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_ka: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours_ka: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours_ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_embed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_content: Option<Value>,
}

impl SettingsUpdate {
    /// Update that only replaces the content tree.
    pub fn content(site_content: Value) -> Self {
        Self {
            site_content: Some(site_content),
            ..Default::default()
        }
    }

    /// Drop blank entries from the phone and email lists.
    pub fn normalized(mut self) -> Self {
        for list in [&mut self.phones, &mut self.emails].into_iter().flatten() {
            list.retain(|entry| !entry.trim().is_empty());
            for entry in list.iter_mut() {
                *entry = entry.trim().to_string();
            }
        }
        self
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_settings() -> SiteSettings {
        serde_json::from_value(json!({
            "id": "settings-1",
            "company_name_ka": "ინტერლაინი",
            "company_name_ru": "",
            "company_name_en": "Interline Georgia",
            "phone": "+995 555 11 22 33",
            "whatsapp": null,
            "email": "info@interline.ge",
            "phones": null,
            "emails": [],
            "address_ka": null,
            "address_ru": null,
            "address_en": "Tbilisi, Rustaveli Ave 1",
            "working_hours_ka": "ორშ-პარ 10:00-19:00",
            "working_hours_ru": null,
            "working_hours_en": "Mon-Fri 10:00-19:00",
            "facebook_url": "https://facebook.com/interline",
            "instagram_url": "",
            "tiktok_url": null,
            "youtube_url": null,
            "map_embed_url": null,
            "logo_url": null,
            "site_content": null,
            "updated_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_null_content_reads_as_empty_tree() {
        let settings = sample_settings();
        assert_eq!(settings.site_content.as_value(), &json!({}));
        assert!(settings.phones.is_empty());
    }

    #[test]
    fn test_localized_fallback() {
        let settings = sample_settings();
        assert_eq!(settings.localized(SettingsField::CompanyName, Language::Georgian), "ინტერლაინი");
        assert_eq!(settings.localized(SettingsField::CompanyName, Language::Russian), "Interline Georgia");
        assert_eq!(settings.localized(SettingsField::Address, Language::Georgian), "Tbilisi, Rustaveli Ave 1");
        assert_eq!(
            settings.localized(SettingsField::WorkingHours, Language::Georgian),
            "ორშ-პარ 10:00-19:00"
        );
    }

    #[test]
    fn test_localized_empty_when_nothing_set() {
        let mut settings = sample_settings();
        settings.address_en = None;
        assert_eq!(settings.localized(SettingsField::Address, Language::Russian), "");
    }

    #[test]
    fn test_contact_fallbacks() {
        let mut settings = sample_settings();
        assert_eq!(settings.primary_phone(), Some("+995 555 11 22 33"));
        assert_eq!(settings.whatsapp_number(), Some("+995 555 11 22 33"));
        assert_eq!(settings.all_emails(), vec!["info@interline.ge"]);

        settings.phones = vec!["".into(), "+995 322 00 00 00".into()];
        settings.whatsapp = Some("+995 599 99 99 99".into());
        assert_eq!(settings.primary_phone(), Some("+995 322 00 00 00"));
        assert_eq!(settings.whatsapp_number(), Some("+995 599 99 99 99"));
    }

    #[test]
    fn test_social_links_skip_blank() {
        let settings = sample_settings();
        assert_eq!(
            settings.social_links(),
            vec![("facebook", "https://facebook.com/interline")]
        );
    }

    #[test]
    fn test_whatsapp_link() {
        assert_eq!(whatsapp_link("+995 555 11-22-33"), "https://wa.me/995555112233");
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = SettingsUpdate {
            phone: Some("+995".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "phone": "+995" }));

        let update = SettingsUpdate::content(json!({ "home": {} }));
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "site_content": { "home": {} } })
        );
    }

    #[test]
    fn test_update_normalized() {
        let update = SettingsUpdate {
            phones: Some(vec![" +995 1 ".into(), " ".into()]),
            emails: Some(vec![]),
            ..Default::default()
        }
        .normalized();
        assert_eq!(update.phones, Some(vec!["+995 1".to_string()]));
        assert_eq!(update.emails, Some(vec![]));
    }
}
