//! Prometheus metrics
//!
//! A private registry prefixed `fileserver_`, fed by the request middleware and
//! the file handlers. Storage gauges are refreshed from the root on each scrape.

use log::warn;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

use crate::storage::Storage;

/// Result label for `file_operations_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_duration: HistogramVec,
    file_operations: IntCounterVec,
    uploaded_bytes: IntCounter,
    storage: Storage,
    stored_files: IntGauge,
    stored_bytes: IntGauge,
}

impl Metrics {
    pub fn new(storage: Storage) -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("fileserver".to_string()), None)?;

        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by route and status"),
            &["method", "route", "status"],
        )?;
        let http_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency by route",
            ),
            &["method", "route"],
        )?;
        let file_operations = IntCounterVec::new(
            Opts::new("file_operations_total", "File operations by kind and outcome"),
            &["operation", "outcome"],
        )?;
        let uploaded_bytes =
            IntCounter::new("uploaded_bytes_total", "Bytes written by successful uploads")?;
        let stored_files = IntGauge::new("stored_files", "Regular files in the storage root")?;
        let stored_bytes =
            IntGauge::new("stored_bytes", "Total size of files in the storage root")?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_duration.clone()))?;
        registry.register(Box::new(file_operations.clone()))?;
        registry.register(Box::new(uploaded_bytes.clone()))?;
        registry.register(Box::new(stored_files.clone()))?;
        registry.register(Box::new(stored_bytes.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_duration,
            file_operations,
            uploaded_bytes,
            storage,
            stored_files,
            stored_bytes,
        })
    }

    pub fn observe_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        self.http_requests
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.http_duration
            .with_label_values(&[method, route])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_operation(&self, operation: &str, outcome: Outcome) {
        self.file_operations
            .with_label_values(&[operation, outcome.as_str()])
            .inc();
    }

    pub fn record_upload(&self, bytes: u64) {
        self.uploaded_bytes.inc_by(bytes);
    }

    /// Render every registered metric in the text exposition format.
    ///
    /// Scans the storage root, so call it off the async runtime.
    pub fn render(&self) -> prometheus::Result<String> {
        match self.storage.usage() {
            Ok(usage) => {
                self.stored_files.set(usage.files as i64);
                self.stored_bytes.set(usage.bytes as i64);
            }
            Err(e) => warn!(
                "Failed to measure storage root {}: {}",
                self.storage.root().display(),
                e
            ),
        }

        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
