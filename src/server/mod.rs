//! Server core functionality
//!
//! Builds the shared state and route table, binds the listener, and runs the
//! HTTP server until a shutdown signal arrives.

pub mod core;

pub use core::{Server, build_router, build_state};
