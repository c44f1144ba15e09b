//! Response bodies
//!
//! JSON shapes returned by the HTTP handlers.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::StorageConfig;
use crate::storage::StoredEntry;

/// Metadata describing one stored file
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub file_name: String,
    pub file_size: u64,
    pub upload_time: DateTime<Local>,
    pub download_url: String,
}

impl FileRecord {
    pub fn new(
        name: &str,
        size: u64,
        upload_time: DateTime<Local>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            file_name: name.to_string(),
            file_size: size,
            upload_time,
            download_url: config.download_url(name),
        }
    }

    pub fn from_entry(entry: StoredEntry, config: &StorageConfig) -> Self {
        Self::new(&entry.name, entry.size, entry.modified, config)
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_info: FileRecord,
    pub direct_url: String,
}

#[derive(Debug, Serialize)]
pub struct FileList {
    pub files: Vec<FileRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Service banner with a map of the file API routes
#[derive(Debug, Serialize)]
pub struct ApiIndex {
    pub message: &'static str,
    pub apis: BTreeMap<&'static str, &'static str>,
}
