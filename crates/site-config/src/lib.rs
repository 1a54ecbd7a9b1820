//! Configuration core for the corporate site.
//!
//! The CMS publishes branding, contact details, language settings and the
//! maintenance switch as one JSON document. This crate fetches it once per
//! TTL window, shares in-flight requests between callers, and exposes typed
//! views with defaults for every missing field.

pub mod config;
pub mod configuration;
pub mod error;
pub mod telemetry;
