use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;

use crate::api::{self, service};
use crate::config::{ConfigLoader, ServerConfig};
use crate::error::StartupError;
use crate::metrics::Metrics;
use crate::middleware::log_requests;
use crate::state::{AppState, SharedState};
use crate::storage::Storage;

pub struct Server {
    listener: TcpListener,
    state: SharedState,
}

/// Prepare the storage root and assemble the shared state
pub async fn build_state(
    config: ServerConfig,
    loader: ConfigLoader,
) -> Result<SharedState, StartupError> {
    let (startup, runtime) = config.split();

    let storage = Storage::new(startup.fileserver.storage_root());
    storage
        .ensure_root()
        .await
        .map_err(|source| StartupError::StorageRoot {
            path: startup.fileserver.path.clone(),
            source,
        })?;
    info!("Storage root: {}", storage.root().display());

    if runtime.read().await.auth.basic.is_empty() {
        warn!("No basic-auth accounts configured; every /api/v1 request will be rejected");
    }

    let metrics = Metrics::new(storage.clone())?;

    Ok(Arc::new(AppState {
        startup,
        runtime,
        loader,
        storage,
        metrics,
    }))
}

/// The full route table with request logging on every matched route
pub fn build_router(state: SharedState) -> Router {
    let static_files = ServeDir::new(&state.startup.web.static_dir);

    Router::new()
        .route("/", get(service::status))
        .route("/check", get(service::status))
        .route("/-/reload", post(service::reload_config))
        .route("/metrics", get(service::metrics))
        .nest_service("/static", static_files)
        .merge(api::api_routes(&state))
        .fallback(service::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

impl Server {
    pub async fn new(config: ServerConfig, loader: ConfigLoader) -> Result<Self, StartupError> {
        let address = config.startup.listen_address.clone();
        let state = build_state(config, loader).await?;

        let listener = TcpListener::bind(&address).await.map_err(|source| {
            error!("Failed to bind to {}: {}", address, source);
            StartupError::Bind {
                address: address.clone(),
                source,
            }
        })?;
        info!("Server bound to {}", address);

        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until SIGINT or SIGTERM, then drain in-flight requests
    pub async fn start(self) -> Result<(), StartupError> {
        if let Ok(addr) = self.local_addr() {
            info!("Starting file server on {}", addr);
        }

        let app = build_router(self.state);
        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

        info!("File server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
