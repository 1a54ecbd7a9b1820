use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::configuration::{
    ConfigurationCache, ConfigurationSource, FetchError, ManualClock, DEFAULT_CACHE_TTL,
};

/// Replays canned responses in order and counts every request.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value, FetchError>>>,
    groups: Mutex<Vec<Option<String>>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    pub(crate) fn new(responses: Vec<Result<Value, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    /// Every fetch blocks until the returned handle is notified.
    pub(crate) fn gated(responses: Vec<Result<Value, FetchError>>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let source = Self {
            gate: Some(gate.clone()),
            ..Self::new(responses)
        };
        (source, gate)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn groups(&self) -> Vec<Option<String>> {
        self.groups.lock().expect("groups mutex").clone()
    }
}

#[async_trait]
impl ConfigurationSource for ScriptedSource {
    async fn fetch(&self, group: Option<&str>) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.groups
            .lock()
            .expect("groups mutex")
            .push(group.map(str::to_string));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .expect("responses mutex")
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".to_string())))
    }
}

pub(crate) fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 9, 24, 8, 0, 0).unwrap())
}

pub(crate) fn cache_with(source: Arc<ScriptedSource>) -> (ConfigurationCache, ManualClock) {
    let clock = clock();
    let cache = ConfigurationCache::with_clock(source, Arc::new(clock.clone()), DEFAULT_CACHE_TTL);
    (cache, clock)
}

pub(crate) fn ttl() -> chrono::Duration {
    chrono::Duration::from_std(DEFAULT_CACHE_TTL).expect("ttl fits")
}

pub(crate) fn short_wait() -> Duration {
    Duration::from_millis(10)
}

pub(crate) fn document(app_name: &str) -> Value {
    json!({
        "general": { "app_name": { "value": app_name } },
        "language": {
            "bilingual_enabled": { "value": true },
            "default_language": { "value": "en" },
        },
        "banners": { "hero": { "value": "/img/hero.png" } },
        "maintenance": { "maintenance_mode": { "value": false } },
    })
}

pub(crate) fn transport_error() -> FetchError {
    FetchError::Transport("connection refused".to_string())
}
