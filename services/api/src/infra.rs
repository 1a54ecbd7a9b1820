use metrics_exporter_prometheus::PrometheusHandle;
use site_config::config::CmsConfig;
use site_config::configuration::{
    Clock, ConfigurationCache, ConfigurationSource, FetchError, HttpConfigurationSource,
    JoinUsGuard, SystemClock,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Option<Arc<PrometheusHandle>>,
    pub(crate) configuration: ConfigurationCache,
    pub(crate) join_us: JoinUsGuard,
}

impl AppState {
    /// One source feeds both the shared cache and the uncached join-us guard.
    pub(crate) fn from_source(source: Arc<dyn ConfigurationSource>, cms: &CmsConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: None,
            configuration: ConfigurationCache::with_clock(source.clone(), clock, cms.cache_ttl),
            join_us: JoinUsGuard::new(source),
        }
    }

    pub(crate) fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(Arc::new(handle));
        self
    }
}

pub(crate) fn http_source(cms: &CmsConfig) -> Result<Arc<dyn ConfigurationSource>, FetchError> {
    let source = HttpConfigurationSource::new(&cms.base_url, cms.timeout)?;
    Ok(Arc::new(source))
}
