pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod state;
pub mod storage;
pub mod utils;

pub use server::{Server, build_router, build_state};
