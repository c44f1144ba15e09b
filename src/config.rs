//! Configuration management for the file server
//!
//! Separates startup configuration (requires restart) from runtime configuration
//! (swapped in place by `POST /-/reload`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Placeholder substituted with the file name in URL templates.
pub const FILENAME_PLACEHOLDER: &str = "{filename}";

pub const DEFAULT_CONFIG_FILE: &str = "configs/config.yaml";
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";

/// Complete server configuration with startup/runtime separation.
///
/// Both halves are read from the same top-level table.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub startup: StartupConfig,
    pub runtime: RuntimeConfig,
}

/// Configuration that requires a server restart to take effect
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    /// Socket address the HTTP listener binds to
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default)]
    pub fileserver: StorageConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Storage root and upload policy
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding every managed file
    pub path: String,

    /// Upper bound on an upload request body, in MiB
    pub max_upload_size_mb: u64,

    /// URL handed back to clients for the sanitized download route
    pub download_url_template: String,

    /// URL handed back to clients for raw static serving of the storage root
    pub direct_url_template: String,
}

/// Locations of the HTML templates and static assets
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    pub templates_dir: String,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Log file, truncated at startup. Empty means stderr.
    pub file: String,
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

/// Configuration that can be replaced while the server is running
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Basic-auth accounts, username to password.
    /// Keys are lower-cased by the config loader.
    #[serde(default)]
    pub basic: HashMap<String, String>,
}

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./uploads".to_string(),
            max_upload_size_mb: 100,
            download_url_template: "/api/v1/file/download/{filename}".to_string(),
            direct_url_template: "/api/v1/file/files/{filename}".to_string(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            templates_dir: "web/templates".to_string(),
            static_dir: "web/static".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: "fileserver.log".to_string(),
            level: "info".to_string(),
        }
    }
}

/// Knows where configuration comes from, so it can be read again on reload.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    listen_address: Option<String>,
}

impl ConfigLoader {
    /// `listen_address` is an explicit command-line value; it beats the file.
    pub fn new(path: impl Into<PathBuf>, listen_address: Option<String>) -> Self {
        Self {
            path: path.into(),
            listen_address,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config file with `FILESERVER__*` environment overrides
    pub fn load(&self) -> Result<ServerConfig, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::from(self.path.as_path()))
            .add_source(Environment::with_prefix("FILESERVER").separator("__"));

        if let Some(address) = &self.listen_address {
            builder = builder.set_override("listen_address", address.as_str())?;
        }

        let settings = builder.build()?;
        let config = ServerConfig {
            startup: settings.clone().try_deserialize()?,
            runtime: settings.try_deserialize()?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ServerConfig {
    /// Split into startup (immutable) and runtime (mutable) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let runtime = Arc::new(RwLock::new(self.runtime));
        (self.startup, runtime)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.startup.listen_address.trim().is_empty() {
            return Err(ConfigError::Message(
                "listen_address cannot be empty".into(),
            ));
        }

        let storage = &self.startup.fileserver;
        if storage.path.trim().is_empty() {
            return Err(ConfigError::Message(
                "fileserver.path cannot be empty".into(),
            ));
        }

        if storage.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "fileserver.max_upload_size_mb must be greater than 0".into(),
            ));
        }

        for (key, template) in [
            ("download_url_template", &storage.download_url_template),
            ("direct_url_template", &storage.direct_url_template),
        ] {
            if !template.contains(FILENAME_PLACEHOLDER) {
                return Err(ConfigError::Message(format!(
                    "fileserver.{key} must contain {FILENAME_PLACEHOLDER}"
                )));
            }
        }

        Ok(())
    }
}

impl StorageConfig {
    /// Get the storage root as PathBuf
    pub fn storage_root(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// Get the maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }

    pub fn download_url(&self, filename: &str) -> String {
        expand_template(&self.download_url_template, filename)
    }

    pub fn direct_url(&self, filename: &str) -> String {
        expand_template(&self.direct_url_template, filename)
    }
}

fn expand_template(template: &str, filename: &str) -> String {
    template.replace(FILENAME_PLACEHOLDER, &urlencoding::encode(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "fileserver:\n  path: ./data\n");

        let config = ConfigLoader::new(path, None).load().unwrap();

        assert_eq!(config.startup.listen_address, DEFAULT_LISTEN_ADDRESS);
        assert_eq!(config.startup.fileserver.path, "./data");
        assert_eq!(config.startup.fileserver.max_upload_size_mb, 100);
        assert_eq!(
            config.startup.fileserver.max_upload_size_bytes(),
            100 * 1024 * 1024
        );
        assert_eq!(config.startup.log.level, "info");
        assert!(config.runtime.auth.basic.is_empty());
    }

    #[test]
    fn test_load_reads_credentials() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "auth:\n  basic:\n    alice: alice123\n    bob: bob123\n",
        );

        let config = ConfigLoader::new(path, None).load().unwrap();

        assert_eq!(config.runtime.auth.basic.len(), 2);
        assert_eq!(
            config.runtime.auth.basic.get("alice").map(String::as_str),
            Some("alice123")
        );
    }

    #[test]
    fn test_cli_listen_address_beats_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "listen_address: 127.0.0.1:9000\n");

        let from_file = ConfigLoader::new(&path, None).load().unwrap();
        assert_eq!(from_file.startup.listen_address, "127.0.0.1:9000");

        let overridden = ConfigLoader::new(&path, Some("127.0.0.1:7000".into()))
            .load()
            .unwrap();
        assert_eq!(overridden.startup.listen_address, "127.0.0.1:7000");
    }

    #[test]
    fn test_rejects_zero_upload_size() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "fileserver:\n  max_upload_size_mb: 0\n");

        assert!(ConfigLoader::new(path, None).load().is_err());
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "fileserver:\n  download_url_template: /download/\n",
        );

        assert!(ConfigLoader::new(path, None).load().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(dir.path().join("absent.yaml"), None);

        assert!(loader.load().is_err());
    }

    #[test]
    fn test_url_templates_encode_name() {
        let storage = StorageConfig::default();

        assert_eq!(
            storage.download_url("report.pdf"),
            "/api/v1/file/download/report.pdf"
        );
        assert_eq!(
            storage.direct_url("my report.pdf"),
            "/api/v1/file/files/my%20report.pdf"
        );
    }
}
