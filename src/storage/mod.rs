//! File system storage management
//!
//! Handles file operations against the storage root and file name validation.

pub mod filesystem;
pub mod results;
pub mod validation;

pub use filesystem::Storage;
pub use results::{StorageUsage, StoredEntry};
pub use validation::{SafeName, sanitize_filename};
