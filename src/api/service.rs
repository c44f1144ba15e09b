//! Service handlers
//!
//! Health checks, API index, configuration reload, metrics, and the 404 page.

use axum::extract::{Extension, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{Local, SecondsFormat};
use log::{error, info};
use std::collections::BTreeMap;
use std::path::Path;

use crate::api::responses::{ApiIndex, HealthResponse, StatusResponse};
use crate::auth::AuthUser;
use crate::error::handlers::ErrorBody;
use crate::state::SharedState;

/// `GET /` and `GET /check`
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "healthy" })
}

/// `GET /api/v1/file/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    })
}

/// `GET /api/v1`
pub async fn greet(Extension(AuthUser(user)): Extension<AuthUser>) -> String {
    format!("hello, {user}")
}

/// `GET /api/v1/file/`
pub async fn api_index() -> Json<ApiIndex> {
    let apis = BTreeMap::from([
        ("upload file", "POST /api/v1/file/upload"),
        ("list files", "GET /api/v1/file/files"),
        ("download file", "GET /api/v1/file/download/{filename}"),
        ("delete file", "DELETE /api/v1/file/file/{filename}"),
        ("direct download", "GET /api/v1/file/files/{filename}"),
        ("health", "GET /api/v1/file/health"),
    ]);

    Json(ApiIndex {
        message: "file server is running",
        apis,
    })
}

/// `POST /-/reload`: re-read the config file and swap the runtime part.
///
/// Startup settings in the file are ignored until restart.
pub async fn reload_config(State(state): State<SharedState>) -> String {
    let path = state.loader.path().display().to_string();

    match state.loader.load() {
        Ok(config) => {
            *state.runtime.write().await = config.runtime;
            info!("Reloaded config file: {path}");
            format!("reload config file: {path}")
        }
        Err(e) => {
            error!("Failed to reload config file {path}: {e}");
            format!("Failed reload config file: {path}, err: {e}")
        }
    }
}

/// `GET /metrics`
pub async fn metrics(State(state): State<SharedState>) -> Response {
    let rendered = tokio::task::spawn_blocking(move || state.metrics.render()).await;

    match rendered {
        Ok(Ok(text)) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], text).into_response(),
        Ok(Err(e)) => {
            error!("Failed to render metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!("Metrics task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Fallback for unknown routes: `404.html` from the templates directory, or
/// the JSON error envelope when there is no template.
pub async fn not_found(State(state): State<SharedState>, uri: Uri) -> Response {
    let template = Path::new(&state.startup.web.templates_dir).join("404.html");

    match tokio::fs::read_to_string(&template).await {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "not found".to_string(),
                message: format!("no route for {}", uri.path()),
            }),
        )
            .into_response(),
    }
}
