use chrono::{DateTime, Datelike, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use super::cache::ConfigurationCache;
use super::document::ConfigurationDocument;

pub const MAINTENANCE_SECTION: &str = "maintenance";
/// Canonical switch for maintenance mode.
pub const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";
/// Older CMS revisions publish the switch under this name.
pub const LEGACY_MAINTENANCE_MODE_KEY: &str = "maintenance_mode_enabled";

/// Whether the site is in maintenance and what the notice should say.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceStatus {
    pub enabled: bool,
    pub title: String,
    pub message: String,
    pub estimated_time: String,
    pub contact_email: String,
}

impl MaintenanceStatus {
    pub fn from_document(document: &ConfigurationDocument) -> Self {
        if !is_maintenance_mode(document) {
            return Self::default();
        }

        let estimated_time = document
            .text(MAINTENANCE_SECTION, "maintenance_end_time")
            .or_else(|| document.text(MAINTENANCE_SECTION, "maintenance_estimated_time"))
            .map(|raw| format_estimated_time(&raw))
            .unwrap_or_default();

        Self {
            enabled: true,
            title: document.text_or_empty(MAINTENANCE_SECTION, "maintenance_title"),
            message: document.text_or_empty(MAINTENANCE_SECTION, "maintenance_message"),
            estimated_time,
            contact_email: document.text_or_empty(MAINTENANCE_SECTION, "maintenance_contact_email"),
        }
    }

    /// Fails open: if the configuration cannot be read the site stays up.
    pub async fn resolve(cache: &ConfigurationCache) -> Self {
        match cache.maintenance_config().await {
            Ok(document) => Self::from_document(&document),
            Err(err) => {
                warn!(error = %err, "maintenance status unavailable, assuming site is live");
                Self::default()
            }
        }
    }
}

pub fn is_maintenance_mode(document: &ConfigurationDocument) -> bool {
    [MAINTENANCE_MODE_KEY, LEGACY_MAINTENANCE_MODE_KEY]
        .iter()
        .any(|key| document.flag(MAINTENANCE_SECTION, key) == Some(true))
}

const INDONESIAN_MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Formats ISO-8601 end times the way the Indonesian notice reads them
/// (`5 Maret 2025 pukul 14.30`). Anything that is not a timestamp is passed
/// through untouched.
pub fn format_estimated_time(raw: &str) -> String {
    if !raw.contains('T') {
        return raw.to_string();
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"));

    match parsed {
        Ok(timestamp) => format!(
            "{} {} {} pukul {}",
            timestamp.day(),
            INDONESIAN_MONTHS[timestamp.month0() as usize],
            timestamp.year(),
            timestamp.format("%H.%M"),
        ),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> ConfigurationDocument {
        ConfigurationDocument::from_envelope(value).expect("document")
    }

    #[test]
    fn wrapped_flag_without_title_enables_with_empty_title() {
        let status = MaintenanceStatus::from_document(&document(json!({
            "maintenance": { "maintenance_mode": { "value": true } }
        })));

        assert!(status.enabled);
        assert_eq!(status.title, "");
        assert_eq!(status.message, "");
    }

    #[test]
    fn legacy_flag_is_honoured() {
        let doc = document(json!({
            "maintenance": {
                "maintenance_mode": { "value": false },
                "maintenance_mode_enabled": { "value": true },
                "maintenance_title": { "value": "Upgrading" },
                "maintenance_contact_email": "ops@tez.example",
            }
        }));

        assert!(is_maintenance_mode(&doc));
        let status = MaintenanceStatus::from_document(&doc);
        assert_eq!(status.title, "Upgrading");
        assert_eq!(status.contact_email, "ops@tez.example");
    }

    #[test]
    fn disabled_mode_discards_notice_fields() {
        let status = MaintenanceStatus::from_document(&document(json!({
            "maintenance": {
                "maintenance_mode": "false",
                "maintenance_title": "Should not leak",
            }
        })));
        assert_eq!(status, MaintenanceStatus::default());
    }

    #[test]
    fn missing_section_means_live_site() {
        assert!(!is_maintenance_mode(&ConfigurationDocument::default()));
    }

    #[test]
    fn estimated_time_falls_back_and_formats() {
        let status = MaintenanceStatus::from_document(&document(json!({
            "maintenance": {
                "maintenance_mode": true,
                "maintenance_estimated_time": { "value": "2025-03-05T14:30:00" },
            }
        })));
        assert_eq!(status.estimated_time, "5 Maret 2025 pukul 14.30");
    }

    #[test]
    fn end_time_wins_over_estimate() {
        let status = MaintenanceStatus::from_document(&document(json!({
            "maintenance": {
                "maintenance_mode": { "value": true },
                "maintenance_end_time": { "value": "2025-12-31T23:05" },
                "maintenance_estimated_time": { "value": "Besok pagi" },
            }
        })));
        assert_eq!(status.estimated_time, "31 Desember 2025 pukul 23.05");
    }

    #[test]
    fn string_switches_do_not_enable_maintenance() {
        let doc = document(json!({
            "maintenance": {
                "maintenance_mode": { "value": "true" },
                "maintenance_mode_enabled": 1,
            }
        }));
        assert!(!is_maintenance_mode(&doc));
    }

    #[test]
    fn free_text_estimates_pass_through() {
        assert_eq!(format_estimated_time("two hours"), "two hours");
        assert_eq!(format_estimated_time("Tomorrow"), "Tomorrow");
        assert_eq!(
            format_estimated_time("2025-03-05T14:30:00+07:00"),
            "5 Maret 2025 pukul 14.30"
        );
        assert_eq!(format_estimated_time("Tidak diketahui"), "Tidak diketahui");
        assert_eq!(format_estimated_time("soon-ish T minus 2"), "soon-ish T minus 2");
    }
}
