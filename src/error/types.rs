//! Error types
//!
//! Defines domain-specific error types for each module of the file server.

use std::io;
use thiserror::Error;

/// Authentication module errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("invalid password for user: {0}")]
    InvalidPassword(String),
}

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The client-supplied name does not reduce to a usable file name
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("file '{0}' not found")]
    NotFound(String),

    /// The content source failed while it was being copied to disk
    #[error("content stream interrupted: {0}")]
    Interrupted(#[source] io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors surfaced to HTTP clients as `{error, message}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid file name")]
    InvalidName(String),

    #[error("file too large")]
    PayloadTooLarge { limit_mb: u64 },

    #[error("invalid file")]
    MalformedRequest(String),

    #[error("file not found")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    /// `label` names the action that failed, e.g. "failed to save file"
    #[error("{label}")]
    Io {
        label: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ApiError {
    /// Convert a storage failure, using `label` when the filesystem itself failed
    pub fn storage(label: &'static str, error: StorageError) -> Self {
        match error {
            StorageError::InvalidName(raw) => ApiError::InvalidName(raw),
            StorageError::NotFound(name) => ApiError::NotFound(name),
            StorageError::Interrupted(e) => ApiError::MalformedRequest(e.to_string()),
            StorageError::Io(source) => ApiError::Io { label, source },
        }
    }

    /// Human-readable detail rendered in the `message` field
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidName(raw) => {
                format!("file name {raw:?} cannot be empty, '.' or '..'")
            }
            ApiError::PayloadTooLarge { limit_mb } => {
                format!("file size cannot exceed {limit_mb}MB")
            }
            ApiError::MalformedRequest(detail) => detail.clone(),
            ApiError::NotFound(name) => format!("file '{name}' not found"),
            ApiError::Unauthorized => "valid basic credentials are required".to_string(),
            ApiError::Io { source, .. } => source.to_string(),
        }
    }
}

/// Failures that stop the server before it accepts connections
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to prepare storage root {path}: {source}")]
    StorageRoot {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
