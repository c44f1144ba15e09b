//! HTTP API
//!
//! Route tables for the authenticated `/api/v1` tree.

pub mod handlers;
pub mod responses;
pub mod service;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};

use crate::middleware::{cors_layer, require_basic_auth};
use crate::state::SharedState;

/// File operations, mounted under `/api/v1/file`
pub fn file_routes(max_upload_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/health", get(service::health))
        .route(
            "/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/files", get(handlers::list_files))
        .route("/files/{*path}", get(handlers::serve_direct))
        .route("/download/{filename}", get(handlers::download_file))
        .route("/file/{filename}", delete(handlers::delete_file))
        .layer(cors_layer())
}

/// Everything under `/api/v1`, behind basic authentication.
///
/// Merged rather than nested: a nested `/` only matches the bare prefix.
pub fn api_routes(state: &SharedState) -> Router<SharedState> {
    let max_upload_bytes = state.startup.fileserver.max_upload_size_bytes();

    Router::new()
        .route("/api/v1", get(service::greet))
        .route("/api/v1/", get(service::greet))
        .route("/api/v1/file/", get(service::api_index))
        .nest("/api/v1/file", file_routes(max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ))
}
