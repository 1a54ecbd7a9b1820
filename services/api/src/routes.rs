use crate::gate::maintenance_gate;
use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use site_config::configuration::{
    ConfigurationDocument, JoinUsConfig, Language, LanguageConfig, MaintenanceStatus, Section,
    SiteProfile,
};
use site_config::error::AppError;
use tracing::warn;

#[derive(Debug, Serialize)]
pub(crate) struct LanguageResponse {
    #[serde(flatten)]
    pub(crate) config: LanguageConfig,
    pub(crate) can_switch_language: bool,
    pub(crate) available_languages: Vec<Language>,
    pub(crate) initial_language: Language,
}

/// Public site routes sit behind the maintenance gate. Probes and the
/// configuration admin endpoints stay reachable so operators can lift
/// maintenance without restarting.
pub(crate) fn site_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/site", get(site_endpoint))
        .route("/api/v1/language", get(language_endpoint))
        .route("/api/v1/banners", get(banners_endpoint))
        .route("/join-us", get(join_us_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), maintenance_gate))
        .route("/api/v1/maintenance", get(maintenance_endpoint))
        .route("/api/v1/configurations/refresh", post(refresh_endpoint))
        .route("/api/v1/configurations/cache", delete(clear_cache_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "configuration_cached": state.configuration.is_cache_valid() })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

pub(crate) async fn site_endpoint(State(state): State<AppState>) -> Json<SiteProfile> {
    Json(SiteProfile::resolve(&state.configuration).await)
}

pub(crate) async fn language_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<LanguageResponse> {
    let config = LanguageConfig::resolve(&state.configuration).await;
    let browser = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());

    Json(LanguageResponse {
        can_switch_language: config.can_switch_language(),
        available_languages: config.available_languages(),
        initial_language: config.initial_language(browser),
        config,
    })
}

pub(crate) async fn maintenance_endpoint(State(state): State<AppState>) -> Json<MaintenanceStatus> {
    Json(MaintenanceStatus::resolve(&state.configuration).await)
}

pub(crate) async fn banners_endpoint(State(state): State<AppState>) -> Json<Section> {
    match state.configuration.banner_config().await {
        Ok(banners) => Json(banners),
        Err(err) => {
            warn!(error = %err, "banner configuration unavailable");
            Json(Section::new())
        }
    }
}

pub(crate) async fn refresh_endpoint(
    State(state): State<AppState>,
) -> Result<Json<ConfigurationDocument>, AppError> {
    let document = state.configuration.fetch_configurations(true).await?;
    Ok(Json(ConfigurationDocument::clone(&document)))
}

pub(crate) async fn clear_cache_endpoint(State(state): State<AppState>) -> StatusCode {
    state.configuration.clear_cache();
    StatusCode::NO_CONTENT
}

pub(crate) async fn join_us_endpoint(State(state): State<AppState>) -> Response {
    if !state.join_us.is_enabled().await {
        let payload = json!({ "error": "Page Not Found" });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    }

    let profile = SiteProfile::resolve(&state.configuration).await;
    (StatusCode::OK, Json::<JoinUsConfig>(profile.join_us)).into_response()
}
