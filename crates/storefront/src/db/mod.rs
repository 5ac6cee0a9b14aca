//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `cartkeeper`
//!
//! ## Tables
//!
//! - `storefront.user` - Users; each row embeds its cart as `cart_items` JSONB
//! - `storefront.product` - Product catalog
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cartkeeper-cli -- migrate
//! ```

pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cartkeeper_core::{CatalogError, StorageError};

pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RepositoryError> for StorageError {
    fn from(err: RepositoryError) -> Self {
        Self::Backend(Box::new(err))
    }
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        Self(Box::new(err))
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
