//! Logging middleware
//!
//! One log line and one metrics sample per request.

use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::net::SocketAddr;
use std::time::Instant;

use crate::state::SharedState;

/// Route label for requests that matched no route
const UNMATCHED_ROUTE: &str = "unmatched";

pub async fn log_requests(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_owned());

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    info!("{status} | {elapsed:>12?} | {client:>15} | {method} {path}");
    state
        .metrics
        .observe_request(method.as_str(), &route, status, elapsed);

    response
}
