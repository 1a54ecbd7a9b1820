use std::sync::Arc;

use tracing::{debug, warn};

use super::document::ConfigurationDocument;
use super::source::ConfigurationSource;

pub const JOIN_US_GROUP: &str = "join_us";
pub const JOIN_US_TOGGLE_KEY: &str = "button_join_us_enabled";

/// Decides whether the careers ("join us") page is reachable.
///
/// Always asks the CMS directly so that toggling the page takes effect on the
/// next request, bypassing the shared cache.
#[derive(Clone)]
pub struct JoinUsGuard {
    source: Arc<dyn ConfigurationSource>,
}

impl std::fmt::Debug for JoinUsGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinUsGuard").finish_non_exhaustive()
    }
}

impl JoinUsGuard {
    pub fn new(source: Arc<dyn ConfigurationSource>) -> Self {
        Self { source }
    }

    /// `false` only when the CMS explicitly disables the page. API errors
    /// leave it open.
    pub async fn is_enabled(&self) -> bool {
        let fetched = self
            .source
            .fetch(Some(JOIN_US_GROUP))
            .await
            .and_then(ConfigurationDocument::from_envelope);

        match fetched {
            Ok(document) => {
                let enabled = join_us_enabled(&document);
                debug!(enabled, "join-us availability checked");
                enabled
            }
            Err(err) => {
                warn!(error = %err, "join-us availability unknown, allowing access");
                true
            }
        }
    }
}

/// Group-filtered responses put the toggle at the root; full documents keep it
/// under the `join_us` section.
pub fn join_us_enabled(document: &ConfigurationDocument) -> bool {
    document
        .root_leaf(JOIN_US_TOGGLE_KEY)
        .and_then(|leaf| leaf.as_flag())
        .or_else(|| document.flag(JOIN_US_GROUP, JOIN_US_TOGGLE_KEY))
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> ConfigurationDocument {
        ConfigurationDocument::from_envelope(value).expect("document")
    }

    #[test]
    fn toggle_is_read_from_group_response() {
        let doc = document(json!({ "data": { "button_join_us_enabled": { "value": false } } }));
        assert!(!join_us_enabled(&doc));
    }

    #[test]
    fn toggle_is_read_from_full_document() {
        let doc = document(json!({ "join_us": { "button_join_us_enabled": { "value": false } } }));
        assert!(!join_us_enabled(&doc));
    }

    #[test]
    fn only_a_boolean_false_closes_the_page() {
        let doc = document(json!({ "data": { "button_join_us_enabled": { "value": "false" } } }));
        assert!(join_us_enabled(&doc));
        let doc = document(json!({ "join_us": { "button_join_us_enabled": 0 } }));
        assert!(join_us_enabled(&doc));
    }

    #[test]
    fn missing_or_null_toggle_keeps_page_open() {
        assert!(join_us_enabled(&ConfigurationDocument::default()));
        let doc = document(json!({ "button_join_us_enabled": { "value": null } }));
        assert!(join_us_enabled(&doc));
    }
}
