//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::{Builder, Env, Target};
use std::fs::File;
use std::io;

use crate::config::LogConfig;

/// Setup logging for the server.
///
/// `RUST_LOG` wins over the configured level. A non-empty `file` sends every
/// record there instead of stderr; the file is truncated on startup.
pub fn setup_logging(config: &LogConfig) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    builder.format_timestamp_micros();

    if !config.file.is_empty() {
        let file = File::create(&config.file)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().map_err(io::Error::other)
}
