//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Cart (JSON, requires a signed-in user)
//! GET    /api/cart             - Cart lines joined with live product data
//! POST   /api/cart             - Add one unit      {"productId": 1}
//! DELETE /api/cart             - Remove a product  {"productId": 1}, or clear with no body
//! PUT    /api/cart/{id}        - Set quantity      {"quantity": 3}; 0 removes
//! ```

pub mod cart;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the cart API router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::show).post(cart::add).delete(cart::remove_all),
        )
        .route("/{id}", axum::routing::put(cart::update_quantity))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api/cart", cart_routes())
}
