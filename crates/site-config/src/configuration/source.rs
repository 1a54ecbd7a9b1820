use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::clock::{Clock, SystemClock};

pub const CONFIGURATIONS_PATH: &str = "api/v1/configurations";

/// Failure to obtain a usable configuration document.
///
/// `Clone` so a single in-flight fetch can hand the same outcome to every
/// waiting caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("configuration request failed: {0}")]
    Transport(String),
    #[error("configuration endpoint returned HTTP {0}")]
    Status(u16),
    #[error("configuration response is not valid JSON: {0}")]
    Decode(String),
    #[error("configuration response has unexpected shape: {0}")]
    Shape(String),
    #[error("configuration fetch ended without producing a result")]
    Interrupted,
}

/// Where configuration documents come from. The cache owns exactly one.
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    /// Fetches the raw response body, optionally restricted to one group.
    async fn fetch(&self, group: Option<&str>) -> Result<Value, FetchError>;
}

/// Reads the document from the CMS over HTTP.
#[derive(Clone)]
pub struct HttpConfigurationSource {
    endpoint: Url,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HttpConfigurationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfigurationSource")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpConfigurationSource {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Transport(format!("unable to build HTTP client: {err}")))?;

        Ok(Self {
            endpoint: configurations_endpoint(base_url)?,
            client,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl ConfigurationSource for HttpConfigurationSource {
    async fn fetch(&self, group: Option<&str>) -> Result<Value, FetchError> {
        let mut request = self.client.get(self.endpoint.clone());
        if let Some(group) = group {
            request = request.query(&[("group", group)]);
        }
        let cache_buster = self.clock.now().timestamp_millis().to_string();
        let request = request
            .query(&[("_t", cache_buster.as_str())])
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");

        debug!(endpoint = %self.endpoint, ?group, "requesting configuration document");

        let response = request
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

/// `<base>/api/v1/configurations`, tolerating a base URL with or without a
/// trailing slash or path prefix.
pub fn configurations_endpoint(base_url: &Url) -> Result<Url, FetchError> {
    let base = base_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/{CONFIGURATIONS_PATH}"))
        .map_err(|err| FetchError::Transport(format!("invalid configuration endpoint: {err}")))
}
