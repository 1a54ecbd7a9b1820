use serde::{Deserialize, Serialize};
use tracing::warn;

use super::cache::ConfigurationCache;
use super::document::Section;
use super::leaf::Leaf;

/// Site languages. Indonesian is the house default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Id,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Id => "id",
            Language::En => "en",
        }
    }

    fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Language::Id),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

/// Language settings from the `language` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    pub bilingual_enabled: bool,
    pub default_language: Language,
    pub language_switcher_enabled: bool,
    pub auto_detect_language: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            bilingual_enabled: true,
            default_language: Language::Id,
            language_switcher_enabled: true,
            auto_detect_language: false,
        }
    }
}

impl LanguageConfig {
    pub fn from_section(section: &Section) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, fallback: bool| {
            section
                .get(key)
                .and_then(|value| Leaf::decode(value).as_bool())
                .unwrap_or(fallback)
        };

        Self {
            bilingual_enabled: flag("bilingual_enabled", defaults.bilingual_enabled),
            default_language: section
                .get("default_language")
                .and_then(|value| Leaf::decode(value).as_text())
                .and_then(|code| Language::from_code(&code))
                .unwrap_or(defaults.default_language),
            language_switcher_enabled: flag(
                "language_switcher_enabled",
                defaults.language_switcher_enabled,
            ),
            auto_detect_language: flag("auto_detect_language", defaults.auto_detect_language),
        }
    }

    /// Reads the section through the cache; any failure yields the defaults.
    pub async fn resolve(cache: &ConfigurationCache) -> Self {
        match cache.language_config().await {
            Ok(section) => Self::from_section(&section),
            Err(err) => {
                warn!(error = %err, "language configuration unavailable, using defaults");
                Self::default()
            }
        }
    }

    pub fn can_switch_language(&self) -> bool {
        self.bilingual_enabled && self.language_switcher_enabled
    }

    pub fn available_languages(&self) -> Vec<Language> {
        if self.bilingual_enabled {
            vec![Language::Id, Language::En]
        } else {
            vec![self.default_language]
        }
    }

    /// Language for a first visit. The browser preference only wins when
    /// auto-detection and bilingual mode are both on.
    pub fn initial_language(&self, browser: Option<&str>) -> Language {
        if self.auto_detect_language && self.bilingual_enabled {
            if let Some(tag) = browser {
                let detected = browser_language(tag);
                if detected != self.default_language {
                    return detected;
                }
            }
        }
        self.default_language
    }
}

/// Maps a browser language tag, or a whole `Accept-Language` header, to a
/// site language. Unknown languages fall back to Indonesian.
pub fn browser_language(tag: &str) -> Language {
    let primary = tag
        .split(',')
        .next()
        .and_then(|entry| entry.split(';').next())
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if primary.contains("id") || primary.contains("indonesia") {
        Language::Id
    } else if primary.contains("en") || primary.contains("english") {
        Language::En
    } else {
        Language::Id
    }
}
