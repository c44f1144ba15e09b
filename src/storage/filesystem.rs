//! File system operations
//!
//! Accessor for the flat storage root. Uses `tokio::fs`, so the blocking calls
//! run on the runtime's blocking pool rather than on request threads.

use chrono::{DateTime, Local};
use log::{debug, error, info};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::error::StorageError;
use crate::storage::results::{StorageUsage, StoredEntry};
use crate::storage::validation::SafeName;

const BUFFER_SIZE: usize = 64 * 1024;

/// Handle on the storage root directory
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage root if it does not exist yet
    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    fn path_of(&self, name: &SafeName) -> PathBuf {
        self.root.join(name)
    }

    /// Lists the regular files in the storage root, in directory order.
    ///
    /// Entries whose metadata cannot be read are skipped.
    pub async fn list(&self) -> Result<Vec<StoredEntry>, StorageError> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            error!("Failed to list storage root {}: {}", self.root.display(), e);
            StorageError::from(e)
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!("Skipping {:?}: {}", entry.file_name(), e);
                    continue;
                }
            };

            if metadata.is_dir() {
                continue;
            }

            let Ok(modified) = metadata.modified() else {
                debug!("Skipping {:?}: no modification time", entry.file_name());
                continue;
            };

            files.push(StoredEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified: DateTime::<Local>::from(modified),
            });
        }

        debug!(
            "Listed storage root {} - {} files",
            self.root.display(),
            files.len()
        );
        Ok(files)
    }

    /// Check whether a regular file with this name exists
    pub async fn exists(&self, name: &SafeName) -> bool {
        fs::metadata(self.path_of(name))
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    /// Creates or truncates `name` and copies `content` into it.
    ///
    /// A failing `content` source yields [`StorageError::Interrupted`]; a failing
    /// disk yields [`StorageError::Io`]. Either way the partial file is left in
    /// place for the caller to deal with.
    pub async fn write<R>(&self, name: &SafeName, mut content: R) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        let path = self.path_of(name);
        let mut file = File::create(&path).await.map_err(|e| {
            error!("Failed to create {}: {}", path.display(), e);
            StorageError::from(e)
        })?;

        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut total_bytes = 0u64;

        loop {
            let n = content
                .read(&mut buffer)
                .await
                .map_err(StorageError::Interrupted)?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n]).await.map_err(|e| {
                error!("Failed to write to {}: {}", path.display(), e);
                StorageError::from(e)
            })?;
            total_bytes += n as u64;
        }

        file.flush().await?;

        info!("Stored {} ({} bytes)", path.display(), total_bytes);
        Ok(total_bytes)
    }

    /// Deletes a file
    pub async fn remove(&self, name: &SafeName) -> Result<(), StorageError> {
        if !self.exists(name).await {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let path = self.path_of(name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                Err(StorageError::from(e))
            }
        }
    }

    /// Opens a file for streaming, returning the handle and its length
    pub async fn open_for_read(&self, name: &SafeName) -> Result<(File, u64), StorageError> {
        let path = self.path_of(name);
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => return Err(StorageError::from(e)),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        Ok((file, metadata.len()))
    }

    /// Counts files and bytes in the storage root.
    ///
    /// Blocking; meant for the metrics collector, which runs off the runtime.
    pub fn usage(&self) -> io::Result<StorageUsage> {
        let mut usage = StorageUsage::default();
        for entry in std::fs::read_dir(&self.root)? {
            let Ok(metadata) = entry.and_then(|e| e.metadata()) else {
                continue;
            };
            if metadata.is_file() {
                usage.files += 1;
                usage.bytes += metadata.len();
            }
        }
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::validation::sanitize_filename;
    use axum::body::Bytes;
    use futures_util::stream;
    use tempfile::TempDir;
    use tokio_util::io::StreamReader;

    fn name(raw: &str) -> SafeName {
        sanitize_filename(raw).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_list() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());

        let written = storage.write(&name("report.pdf"), &b"abc"[..]).await.unwrap();
        assert_eq!(written, 3);

        let files = storage.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "report.pdf");
        assert_eq!(files[0].size, 3);
    }

    #[tokio::test]
    async fn test_list_skips_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let storage = Storage::new(dir.path());

        let files = storage.list().await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.txt");
    }

    #[tokio::test]
    async fn test_list_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("missing"));

        assert!(matches!(storage.list().await, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_write_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());

        storage.write(&name("a.txt"), &b"longer content"[..]).await.unwrap();
        storage.write(&name("a.txt"), &b"short"[..]).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"short");
    }

    #[tokio::test]
    async fn test_write_reports_interrupted_source() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        let chunks: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::other("connection reset")),
        ];
        let reader = StreamReader::new(stream::iter(chunks));

        let result = storage.write(&name("broken.bin"), reader).await;

        assert!(matches!(result, Err(StorageError::Interrupted(_))));
        assert!(dir.path().join("broken.bin").exists());
    }

    #[tokio::test]
    async fn test_exists_and_remove() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        let file = name("gone.txt");

        assert!(!storage.exists(&file).await);
        assert!(matches!(
            storage.remove(&file).await,
            Err(StorageError::NotFound(_))
        ));

        storage.write(&file, &b"x"[..]).await.unwrap();
        assert!(storage.exists(&file).await);

        storage.remove(&file).await.unwrap();
        assert!(!storage.exists(&file).await);
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let storage = Storage::new(dir.path());

        assert!(!storage.exists(&name("nested")).await);
        assert!(matches!(
            storage.open_for_read(&name("nested")).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_open_for_read_returns_length() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        storage.write(&name("data.bin"), &b"0123456789"[..]).await.unwrap();

        let (mut file, len) = storage.open_for_read(&name("data.bin")).await.unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).await.unwrap();

        assert_eq!(len, 10);
        assert_eq!(content, b"0123456789");
    }

    #[tokio::test]
    async fn test_usage_counts_files_only() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a"), b"12").unwrap();
        std::fs::write(dir.path().join("b"), b"345").unwrap();
        let storage = Storage::new(dir.path());

        assert_eq!(storage.usage().unwrap(), StorageUsage { files: 2, bytes: 5 });
    }
}
