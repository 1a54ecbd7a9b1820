use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::cache::ConfigurationCache;
use super::document::ConfigurationDocument;
use super::leaf::Leaf;

pub const DEFAULT_OJK_TITLE: &str = "Berizin dan Diawasi oleh Otoritas Jasa Keuangan";
pub const DEFAULT_OJK_DESCRIPTION: &str = "© 2025 PT TEZ Capital and Finance. All Rights Reserved";

/// Branding and contact details shown across every page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteProfile {
    pub general: GeneralConfig,
    pub contact: ContactConfig,
    pub ojk: OjkConfig,
    pub join_us: JoinUsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneralConfig {
    pub app_name: String,
    pub app_description: String,
    pub apply_now_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactConfig {
    pub social_media: Vec<SocialMediaItem>,
    pub contact_phone: String,
    pub contact_email: String,
    pub contact_address: String,
    pub contact_whatsapp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMediaItem {
    pub platform: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Regulator (OJK) disclosure block in the footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OjkConfig {
    pub ojk_title: String,
    pub ojk_description: String,
    pub ojk_images: Vec<Value>,
}

impl Default for OjkConfig {
    fn default() -> Self {
        Self {
            ojk_title: DEFAULT_OJK_TITLE.to_string(),
            ojk_description: DEFAULT_OJK_DESCRIPTION.to_string(),
            ojk_images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinUsConfig {
    pub career_application_email: String,
}

impl SiteProfile {
    pub fn from_document(document: &ConfigurationDocument) -> Self {
        let general = GeneralConfig {
            app_name: document.text_or_empty("general", "app_name"),
            app_description: document.text_or_empty("general", "app_description"),
            apply_now_link: document.text_or_empty("general", "apply_now_link"),
        };

        let contact = ContactConfig {
            social_media: document
                .leaf("contact", "social_media")
                .map(|leaf| parse_social_media(leaf.value()))
                .unwrap_or_default(),
            contact_phone: document.text_or_empty("contact", "contact_phone"),
            contact_email: document.text_or_empty("contact", "contact_email"),
            contact_address: document.text_or_empty("contact", "contact_address"),
            contact_whatsapp: document.text_or_empty("contact", "contact_whatsapp"),
        };

        let ojk = OjkConfig {
            ojk_title: document
                .text("ojk", "ojk_title")
                .unwrap_or_else(|| DEFAULT_OJK_TITLE.to_string()),
            ojk_description: document
                .text("ojk", "ojk_description")
                .unwrap_or_else(|| DEFAULT_OJK_DESCRIPTION.to_string()),
            ojk_images: document
                .leaf("ojk", "ojk_images")
                .and_then(|leaf| leaf.as_list("ojk_images"))
                .unwrap_or_default(),
        };

        let join_us = JoinUsConfig {
            career_application_email: document.text_or_empty("join_us", "career_application_email"),
        };

        Self {
            general,
            contact,
            ojk,
            join_us,
        }
    }

    /// Resolves the profile through the cache. Fetch failures degrade to the
    /// empty profile rather than surfacing.
    pub async fn resolve(cache: &ConfigurationCache) -> Self {
        match cache.fetch_configurations(false).await {
            Ok(document) => Self::from_document(&document),
            Err(err) => {
                warn!(error = %err, "site profile unavailable, using defaults");
                Self::default()
            }
        }
    }
}

/// Social links arrive in three shapes: a JSON-encoded list, an actual list,
/// or a `{platform: url}` object. Unparseable input yields no links.
pub fn parse_social_media(raw: &Value) -> Vec<SocialMediaItem> {
    let raw = Leaf::decode(raw).value();
    match raw {
        Value::String(encoded) => match serde_json::from_str::<Vec<SocialMediaItem>>(encoded) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "failed to parse social media list");
                Vec::new()
            }
        },
        Value::Array(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<SocialMediaItem>(item.clone()).ok())
            .collect(),
        Value::Object(links) => links
            .iter()
            .filter_map(|(platform, url)| {
                let url = url.as_str()?.trim();
                (!url.is_empty()).then(|| SocialMediaItem {
                    platform: platform.clone(),
                    url: url.to_string(),
                    icon: None,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> ConfigurationDocument {
        ConfigurationDocument::from_envelope(value).expect("document")
    }

    #[test]
    fn social_media_from_encoded_string() {
        let items = parse_social_media(&json!(r#"[{"platform":"ig","url":"http://x"}]"#));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].platform, "ig");
        assert_eq!(items[0].url, "http://x");
    }

    #[test]
    fn social_media_from_array_matches_encoded_form() {
        let encoded = parse_social_media(&json!(r#"[{"platform":"ig","url":"http://x"}]"#));
        let parsed = parse_social_media(&json!([{ "platform": "ig", "url": "http://x" }]));
        assert_eq!(encoded, parsed);
    }

    #[test]
    fn social_media_from_object_skips_blank_urls() {
        let items = parse_social_media(&json!({ "facebook": "http://fb", "twitter": "" }));
        assert_eq!(
            items,
            vec![SocialMediaItem {
                platform: "facebook".to_string(),
                url: "http://fb".to_string(),
                icon: None,
            }]
        );
    }

    #[test]
    fn social_media_unwraps_value_envelope() {
        let items = parse_social_media(&json!({ "value": { "linkedin": "http://li" } }));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].platform, "linkedin");
    }

    #[test]
    fn malformed_social_media_string_yields_empty_list() {
        assert!(parse_social_media(&json!("[{broken")).is_empty());
        assert!(parse_social_media(&json!(42)).is_empty());
    }

    #[test]
    fn profile_reads_wrapped_and_raw_leaves() {
        let profile = SiteProfile::from_document(&document(json!({
            "general": {
                "app_name": { "value": "TEZ Capital" },
                "app_description": "Financing partner",
            },
            "contact": {
                "contact_phone": { "value": 1500123 },
                "contact_email": "hello@tez.example",
                "social_media": { "value": "[{\"platform\":\"ig\",\"url\":\"http://ig\"}]" },
            },
            "join_us": { "career_application_email": { "value": "careers@tez.example" } },
        })));

        assert_eq!(profile.general.app_name, "TEZ Capital");
        assert_eq!(profile.general.app_description, "Financing partner");
        assert_eq!(profile.general.apply_now_link, "");
        assert_eq!(profile.contact.contact_phone, "1500123");
        assert_eq!(profile.contact.contact_email, "hello@tez.example");
        assert_eq!(profile.contact.social_media.len(), 1);
        assert_eq!(profile.join_us.career_application_email, "careers@tez.example");
    }

    #[test]
    fn ojk_block_falls_back_to_regulatory_defaults() {
        let profile = SiteProfile::from_document(&document(json!({
            "ojk": { "ojk_title": { "value": "" }, "ojk_images": "not json" },
        })));

        assert_eq!(profile.ojk.ojk_title, DEFAULT_OJK_TITLE);
        assert_eq!(profile.ojk.ojk_description, DEFAULT_OJK_DESCRIPTION);
        assert!(profile.ojk.ojk_images.is_empty());
        assert_eq!(SiteProfile::default().ojk, profile.ojk);
    }
}
