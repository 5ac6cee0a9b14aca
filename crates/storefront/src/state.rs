//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use cartkeeper_core::{CartService, CartStore, Catalog};

use crate::config::StorefrontConfig;
use crate::db::{ProductRepository, UserRepository};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    cart_store: Arc<dyn CartStore>,
    carts: CartService,
}

impl AppState {
    /// Create application state backed by `PostgreSQL` repositories.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = Arc::new(ProductRepository::new(pool.clone()));
        let store = Arc::new(UserRepository::new(pool.clone()));
        Self::with_ports(config, pool, catalog, store)
    }

    /// Create application state with explicit catalog and cart store.
    ///
    /// The pool is still used for readiness checks.
    #[must_use]
    pub fn with_ports(
        config: StorefrontConfig,
        pool: PgPool,
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn CartStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carts: CartService::new(catalog, Arc::clone(&store)),
                cart_store: store,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the store that cart owners are loaded from.
    #[must_use]
    pub fn cart_store(&self) -> &dyn CartStore {
        self.inner.cart_store.as_ref()
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }
}
