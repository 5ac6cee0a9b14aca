//! Cartkeeper Storefront library.
//!
//! This crate provides the cart HTTP API and its `PostgreSQL` adapters as a
//! library, allowing them to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router without the session layer.
///
/// The caller adds a `SessionManagerLayer` (`PostgreSQL`-backed in
/// production, in-memory in tests) and the Sentry layers.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_request_span))
        .with_state(state)
}
