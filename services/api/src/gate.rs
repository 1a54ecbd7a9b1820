use crate::infra::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, Utc};
use serde_json::json;
use site_config::configuration::MaintenanceStatus;
use tracing::info;

pub(crate) const DEFAULT_MAINTENANCE_TITLE: &str = "Situs Sedang Dalam Pemeliharaan";
pub(crate) const DEFAULT_MAINTENANCE_MESSAGE: &str =
    "Kami sedang melakukan pemeliharaan terjadwal untuk meningkatkan layanan. Mohon coba lagi nanti.";

/// Replaces every gated response with the maintenance notice while the CMS
/// has maintenance mode on. API clients get JSON, browsers get the page.
pub(crate) async fn maintenance_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let status = MaintenanceStatus::resolve(&state.configuration).await;
    if !status.enabled {
        return next.run(request).await;
    }

    let path = request.uri().path();
    info!(path, "request blocked by maintenance mode");

    if path.starts_with("/api/") {
        let payload = json!({
            "error": "Service Unavailable - Maintenance Mode",
            "maintenance": true,
            "config": status,
        });
        return (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response();
    }

    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(render_maintenance_notice(&status)),
    )
        .into_response()
}

pub(crate) fn render_maintenance_notice(status: &MaintenanceStatus) -> String {
    let title = fallback(&status.title, DEFAULT_MAINTENANCE_TITLE);
    let message = fallback(&status.message, DEFAULT_MAINTENANCE_MESSAGE);

    let estimate = if status.estimated_time.trim().is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"estimate\">\n<span>Estimasi Waktu Selesai</span>\n<p>{}</p>\n</div>",
            escape_html(&status.estimated_time)
        )
    };

    let contact = if status.contact_email.is_empty() {
        String::new()
    } else {
        let email = escape_html(&status.contact_email);
        format!("<p class=\"contact\">Hubungi Kami: <a href=\"mailto:{email}\">{email}</a></p>")
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<main class=\"maintenance\">\n<h1>{title}</h1>\n<p>{message}</p>\n{estimate}\n{contact}\n<p class=\"footer\">© {year} TEZ Capital &amp; Finance. Semua hak dilindungi.</p>\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        message = escape_html(message),
        estimate = estimate,
        contact = contact,
        year = Utc::now().year(),
    )
}

fn fallback<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
