//! Error handlers
//!
//! Maps errors onto HTTP status codes and the JSON error envelope.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;

use crate::error::types::ApiError;

/// Realm advertised in `WWW-Authenticate` challenges
pub const AUTH_REALM: &str = r#"Basic realm="Authorization Required""#;

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Log an API error once, at the handler boundary
pub fn handle_error(err: &ApiError) {
    let status = error_to_status(err);
    if status.is_server_error() {
        error!("{}: {}", err, err.message());
    } else {
        warn!("{} ({}): {}", err, status.as_u16(), err.message());
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::InvalidName(_) => StatusCode::BAD_REQUEST,
        ApiError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
        ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        ApiError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        handle_error(&self);

        let status = error_to_status(&self);
        let body = ErrorBody {
            error: self.to_string(),
            message: self.message(),
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_REALM),
            );
        }
        response
    }
}
