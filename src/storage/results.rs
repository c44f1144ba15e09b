//! Storage result types
//!
//! Defines result structures returned by storage operations.

use chrono::{DateTime, Local};

/// A regular file found in the storage root
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Aggregate size of the storage root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageUsage {
    pub files: u64,
    pub bytes: u64,
}
