//! Shared application state handed to every handler

use std::sync::Arc;

use crate::config::{ConfigLoader, SharedRuntimeConfig, StartupConfig};
use crate::metrics::Metrics;
use crate::storage::Storage;

pub struct AppState {
    pub startup: StartupConfig,
    pub runtime: SharedRuntimeConfig,
    pub loader: ConfigLoader,
    pub storage: Storage,
    pub metrics: Metrics,
}

pub type SharedState = Arc<AppState>;
