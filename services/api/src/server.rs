use crate::cli::ServeArgs;
use crate::infra::{http_source, AppState};
use crate::routes::site_router;
use axum_prometheus::PrometheusMetricLayer;
use site_config::config::AppConfig;
use site_config::error::AppError;
use site_config::telemetry;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let source = http_source(&config.cms)?;
    let app_state = AppState::from_source(source, &config.cms).with_metrics(prometheus_handle);
    let readiness_flag = app_state.readiness.clone();

    // Warm the cache; an unreachable CMS only degrades the first requests.
    if let Err(err) = app_state.configuration.fetch_configurations(false).await {
        warn!(error = %err, base_url = %config.cms.base_url, "initial configuration fetch failed");
    }

    let app = site_router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        cms = %config.cms.base_url,
        ttl_ms = whole_millis(config.cms.cache_ttl),
        "site configuration service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
