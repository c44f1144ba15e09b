//! Server middleware
//!
//! Provides request logging, basic authentication, and CORS.

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::require_basic_auth;
pub use cors::cors_layer;
pub use logging::log_requests;
