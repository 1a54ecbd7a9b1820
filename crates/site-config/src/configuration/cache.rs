use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::document::{ConfigurationDocument, Section};
use super::source::{ConfigurationSource, FetchError};

/// Documents younger than this are served without touching the network.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(300_000);

pub type FetchOutcome = Result<Arc<ConfigurationDocument>, FetchError>;

type OutcomeReceiver = watch::Receiver<Option<FetchOutcome>>;

#[derive(Debug, Default)]
struct CacheState {
    document: Option<Arc<ConfigurationDocument>>,
    fetched_at: Option<DateTime<Utc>>,
    last_error: Option<FetchError>,
    in_flight: Option<OutcomeReceiver>,
}

struct CacheInner {
    source: Arc<dyn ConfigurationSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

/// TTL-bounded, single-flight cache over the CMS configuration document.
///
/// Cloning is cheap and every clone shares the same state. Only the spawned
/// fetch task writes the document; everyone else reads or waits on it.
#[derive(Clone)]
pub struct ConfigurationCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for ConfigurationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationCache")
            .field("ttl", &self.inner.ttl)
            .field("clock", &self.inner.clock)
            .finish_non_exhaustive()
    }
}

impl ConfigurationCache {
    pub fn new(source: Arc<dyn ConfigurationSource>) -> Self {
        Self::with_clock(source, Arc::new(SystemClock), DEFAULT_CACHE_TTL)
    }

    pub fn with_clock(
        source: Arc<dyn ConfigurationSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                clock,
                ttl,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Returns the configuration document, fetching it when the cached copy is
    /// missing, expired, or `force_refresh` is set.
    ///
    /// Callers arriving while a fetch is in flight share its outcome instead
    /// of issuing their own request. A failed fetch falls back to the last
    /// good document; the error only escapes when there is nothing cached.
    pub async fn fetch_configurations(&self, force_refresh: bool) -> FetchOutcome {
        let mut receiver = {
            let mut state = self.inner.lock_state();

            if !force_refresh {
                if let Some(document) = self.inner.fresh_document(&state) {
                    return Ok(document);
                }
            }

            // A closed channel means the previous fetch task died; start over.
            let joinable = state
                .in_flight
                .as_ref()
                .filter(|receiver| receiver.has_changed().is_ok())
                .cloned();

            match joinable {
                Some(receiver) => {
                    debug!("joining in-flight configuration fetch");
                    receiver
                }
                None => {
                    let (sender, receiver) = watch::channel(None);
                    state.in_flight = Some(receiver.clone());
                    state.last_error = None;
                    self.spawn_fetch(sender);
                    receiver
                }
            }
        };

        let settled = receiver
            .wait_for(Option::is_some)
            .await
            .map(|outcome| (*outcome).clone());

        match settled {
            Ok(Some(outcome)) => outcome,
            Ok(None) | Err(_) => Err(FetchError::Interrupted),
        }
    }

    /// The `language` section, empty when absent.
    pub async fn language_config(&self) -> Result<Section, FetchError> {
        let document = self.fetch_configurations(false).await?;
        Ok(document.section_or_empty("language"))
    }

    /// The whole document. Maintenance flags live under `maintenance`, but
    /// consumers historically receive everything.
    pub async fn maintenance_config(&self) -> FetchOutcome {
        self.fetch_configurations(false).await
    }

    /// The `banners` section, empty when absent.
    pub async fn banner_config(&self) -> Result<Section, FetchError> {
        let document = self.fetch_configurations(false).await?;
        Ok(document.section_or_empty("banners"))
    }

    /// Forgets the cached document, its timestamp and the last error. A fetch
    /// already in flight is left alone.
    pub fn clear_cache(&self) {
        let mut state = self.inner.lock_state();
        state.document = None;
        state.fetched_at = None;
        state.last_error = None;
        debug!("configuration cache cleared");
    }

    pub fn is_cache_valid(&self) -> bool {
        let state = self.inner.lock_state();
        self.inner.fresh_document(&state).is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock_state().in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<FetchError> {
        self.inner.lock_state().last_error.clone()
    }

    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.inner.lock_state().fetched_at
    }

    /// Whatever is cached, fresh or not.
    pub fn cached(&self) -> Option<Arc<ConfigurationDocument>> {
        self.inner.lock_state().document.clone()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    fn spawn_fetch(&self, sender: watch::Sender<Option<FetchOutcome>>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let fetched = inner
                .source
                .fetch(None)
                .await
                .and_then(ConfigurationDocument::from_envelope);
            let outcome = inner.settle(fetched);
            sender.send_replace(Some(outcome));
        });
    }
}

impl CacheInner {
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_document(&self, state: &CacheState) -> Option<Arc<ConfigurationDocument>> {
        let document = state.document.as_ref()?;
        let fetched_at = state.fetched_at?;
        // A clock that moved backwards still counts as fresh.
        let fresh = match (self.clock.now() - fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        };
        fresh.then(|| Arc::clone(document))
    }

    fn settle(&self, fetched: Result<ConfigurationDocument, FetchError>) -> FetchOutcome {
        let mut state = self.lock_state();
        state.in_flight = None;

        match fetched {
            Ok(document) => {
                let document = Arc::new(document);
                state.document = Some(Arc::clone(&document));
                state.fetched_at = Some(self.clock.now());
                info!(sections = document.len(), "configuration document cached");
                Ok(document)
            }
            Err(err) => {
                state.last_error = Some(err.clone());
                match state.document.as_ref() {
                    Some(stale) => {
                        warn!(error = %err, "configuration fetch failed, serving stale document");
                        Ok(Arc::clone(stale))
                    }
                    None => {
                        warn!(error = %err, "configuration fetch failed with nothing cached");
                        Err(err)
                    }
                }
            }
        }
    }
}
