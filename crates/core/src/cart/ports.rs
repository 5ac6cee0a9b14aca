//! Collaborators the cart depends on.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::{Cart, CartOwner};
use crate::types::{Product, ProductId, UserId};

/// Boxed error from an adapter's backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Failure loading or saving a cart owner.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The owning record no longer exists.
    #[error("cart owner {0} not found")]
    OwnerNotFound(UserId),

    /// The storage backend failed.
    #[error("storage backend failed: {0}")]
    Backend(#[source] BackendError),
}

/// Failure querying the product catalog.
#[derive(Debug, Error)]
#[error("catalog lookup failed: {0}")]
pub struct CatalogError(#[source] pub BackendError);

/// Read-only product lookup.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch every product whose ID is in `ids`.
    ///
    /// IDs with no product are skipped. Order is up to the implementation.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError>;
}

/// Persistence for the cart field on the user record.
///
/// [`save_cart`](Self::save_cart) replaces the whole field unconditionally,
/// so the last save for a user wins. [`replace_cart`](Self::replace_cart)
/// only writes over the exact value the caller read.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load a user's record with its stored cart.
    async fn load_owner(&self, user: UserId) -> Result<Option<CartOwner>, StorageError>;

    /// Overwrite a user's stored cart.
    async fn save_cart(&self, user: UserId, cart: &Cart) -> Result<(), StorageError>;

    /// Overwrite a user's stored cart if it still equals `expected`.
    ///
    /// Returns `false` without writing when the stored value changed after
    /// `expected` was read, or the user no longer exists.
    async fn replace_cart(
        &self,
        user: UserId,
        expected: &Value,
        cart: &Cart,
    ) -> Result<bool, StorageError>;
}
