//! Fetching, caching and interpreting the CMS configuration document.
//!
//! [`ConfigurationCache`] owns the single-flight fetch. The remaining modules
//! turn the untyped document into the views the site needs, each falling back
//! to safe defaults when a leaf is missing or malformed.

pub mod cache;
pub mod clock;
pub mod document;
pub mod join_us;
pub mod language;
pub(crate) mod leaf;
pub mod maintenance;
pub mod site;
pub mod source;

#[cfg(test)]
mod tests;

pub use cache::{ConfigurationCache, FetchOutcome, DEFAULT_CACHE_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use document::{ConfigurationDocument, Section};
pub use join_us::{join_us_enabled, JoinUsGuard};
pub use language::{browser_language, Language, LanguageConfig};
pub use leaf::Leaf;
pub use maintenance::{is_maintenance_mode, MaintenanceStatus};
pub use site::{
    parse_social_media, ContactConfig, GeneralConfig, JoinUsConfig, OjkConfig, SiteProfile,
    SocialMediaItem,
};
pub use source::{ConfigurationSource, FetchError, HttpConfigurationSource};
