//! File handlers
//!
//! Upload, list, download, and delete over the storage root. Every handler
//! sanitizes the client-supplied name before touching the filesystem.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use chrono::Local;
use futures_util::TryStreamExt;
use log::{info, warn};
use std::io;
use tokio_util::io::{ReaderStream, StreamReader};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::api::responses::{FileList, FileRecord, MessageResponse, UploadResponse};
use crate::error::{ApiError, StorageError};
use crate::metrics::Outcome;
use crate::state::SharedState;
use crate::storage::{SafeName, sanitize_filename};

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

const CONTENT_DESCRIPTION: HeaderName = HeaderName::from_static("content-description");
const CONTENT_TRANSFER_ENCODING: HeaderName = HeaderName::from_static("content-transfer-encoding");

/// `POST /upload`
pub async fn upload_file(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let limit_mb = state.startup.fileserver.max_upload_size_mb;
    let mut multipart =
        multipart.map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit_mb))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        return store_upload(&state, field).await;
    }

    Err(ApiError::MalformedRequest(format!(
        "multipart field '{UPLOAD_FIELD}' is missing"
    )))
}

async fn store_upload(
    state: &SharedState,
    field: Field<'_>,
) -> Result<Json<UploadResponse>, ApiError> {
    let config = &state.startup.fileserver;

    let raw_name = field
        .file_name()
        .ok_or_else(|| {
            ApiError::MalformedRequest(format!("field '{UPLOAD_FIELD}' is not a file upload"))
        })?
        .to_owned();
    let name = sanitize_filename(&raw_name)
        .map_err(|e| ApiError::storage("invalid file name", e))?;

    let content = StreamReader::new(field.map_err(content_error));
    let size = match state.storage.write(&name, content).await {
        Ok(size) => size,
        Err(StorageError::Interrupted(e)) => {
            state.metrics.record_operation("upload", Outcome::Failure);
            discard_partial(state, &name).await;
            return Err(if e.kind() == io::ErrorKind::FileTooLarge {
                ApiError::PayloadTooLarge {
                    limit_mb: config.max_upload_size_mb,
                }
            } else {
                ApiError::MalformedRequest(e.to_string())
            });
        }
        Err(e) => {
            state.metrics.record_operation("upload", Outcome::Failure);
            return Err(ApiError::storage("failed to save file", e));
        }
    };

    state.metrics.record_operation("upload", Outcome::Success);
    state.metrics.record_upload(size);
    info!("Uploaded {name} ({size} bytes)");

    Ok(Json(UploadResponse {
        message: "file uploaded".to_string(),
        file_info: FileRecord::new(name.as_str(), size, Local::now(), config),
        direct_url: config.direct_url(name.as_str()),
    }))
}

/// Classify a multipart failure that happened before any content was written
fn multipart_error(error: MultipartError, limit_mb: u64) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit_mb }
    } else {
        ApiError::MalformedRequest(error.body_text())
    }
}

/// Carry an over-limit body through the copy loop as `FileTooLarge`
fn content_error(error: MultipartError) -> io::Error {
    let kind = if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::ErrorKind::FileTooLarge
    } else {
        io::ErrorKind::InvalidData
    };
    io::Error::new(kind, error.body_text())
}

/// Remove what an aborted upload left behind
async fn discard_partial(state: &SharedState, name: &SafeName) {
    match state.storage.remove(name).await {
        Ok(()) | Err(StorageError::NotFound(_)) => {}
        Err(e) => warn!("Failed to discard partial upload {name}: {e}"),
    }
}

/// `GET /files`
pub async fn list_files(State(state): State<SharedState>) -> Result<Json<FileList>, ApiError> {
    let entries = state
        .storage
        .list()
        .await
        .map_err(|e| ApiError::storage("failed to read file list", e))?;

    let config = &state.startup.fileserver;
    let files: Vec<FileRecord> = entries
        .into_iter()
        .map(|entry| FileRecord::from_entry(entry, config))
        .collect();

    Ok(Json(FileList {
        count: files.len(),
        files,
    }))
}

/// `GET /download/{filename}`
pub async fn download_file(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name =
        sanitize_filename(&filename).map_err(|e| ApiError::storage("invalid file name", e))?;

    if !state.storage.exists(&name).await {
        return Err(ApiError::NotFound(name.into_string()));
    }

    let (file, len) = state.storage.open_for_read(&name).await.map_err(|e| {
        state.metrics.record_operation("download", Outcome::Failure);
        ApiError::storage("failed to open file", e)
    })?;
    state.metrics.record_operation("download", Outcome::Success);

    let headers = [
        (CONTENT_DESCRIPTION, HeaderValue::from_static("File Transfer")),
        (CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary")),
        (header::CONTENT_DISPOSITION, attachment_disposition(name.as_str())),
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(len)),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn attachment_disposition(name: &str) -> HeaderValue {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    let value = format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(name)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// `DELETE /file/{filename}`
pub async fn delete_file(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name =
        sanitize_filename(&filename).map_err(|e| ApiError::storage("invalid file name", e))?;

    if let Err(e) = state.storage.remove(&name).await {
        if !matches!(e, StorageError::NotFound(_)) {
            state.metrics.record_operation("delete", Outcome::Failure);
        }
        return Err(ApiError::storage("failed to delete file", e));
    }
    state.metrics.record_operation("delete", Outcome::Success);

    Ok(Json(MessageResponse {
        message: format!("file '{name}' deleted"),
    }))
}

/// `GET /files/{*path}`: raw static serving of the storage root.
///
/// Skips the name sanitizer; `ServeDir` rejects `..` segments on its own.
pub async fn serve_direct(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    mut request: Request,
) -> Response {
    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    let Ok(uri) = format!("/{}", encoded.join("/")).parse::<Uri>() else {
        return ApiError::MalformedRequest(format!("unusable path {path:?}")).into_response();
    };
    *request.uri_mut() = uri;

    match ServeDir::new(state.storage.root()).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
