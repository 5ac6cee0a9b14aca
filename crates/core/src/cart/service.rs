//! Cart operations against injected ports.

use std::sync::Arc;

use tracing::instrument;

use super::{
    Cart, CartError, CartItem, CartOwner, CartStore, Catalog, normalize, normalize_stored,
    reconcile,
};
use crate::types::ProductId;

/// Reads and mutates user carts.
///
/// Every operation normalizes the owner's stored cart first, applies its
/// change to that copy, and saves at most once. Nothing here serializes
/// concurrent requests for the same user: two mutations that load the same
/// record race, and the later save wins.
#[derive(Clone)]
pub struct CartService {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn CartStore>,
}

impl CartService {
    /// Create a cart service over the given catalog and store.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, store: Arc<dyn CartStore>) -> Self {
        Self { catalog, store }
    }

    /// Current cart joined with live product data.
    ///
    /// A stored cart in a legacy shape is written back in canonical form
    /// before the catalog is queried.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if writing back a healed cart fails, or
    /// `CartError::Catalog` if the product lookup fails.
    #[instrument(skip(self, owner), fields(user_id = %owner.id))]
    pub async fn get(&self, owner: CartOwner) -> Result<Vec<CartItem>, CartError> {
        let normalized = normalize_stored(&owner.cart_items);
        if normalized.healed {
            tracing::info!("rewriting stored cart in canonical shape");
            self.store.save_cart(owner.id, &normalized.cart).await?;
        }

        Ok(reconcile(&normalized.cart, self.catalog.as_ref()).await?)
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the save fails.
    #[instrument(skip(self, owner), fields(user_id = %owner.id))]
    pub async fn add(&self, owner: CartOwner, product: ProductId) -> Result<Cart, CartError> {
        self.mutate(owner, |cart| {
            cart.add(product);
            Ok(())
        })
        .await
    }

    /// Remove every line for `product`, or empty the cart when `product` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the save fails.
    #[instrument(skip(self, owner), fields(user_id = %owner.id))]
    pub async fn remove_all(
        &self,
        owner: CartOwner,
        product: Option<ProductId>,
    ) -> Result<Cart, CartError> {
        self.mutate(owner, |cart| {
            cart.remove_all(product);
            Ok(())
        })
        .await
    }

    /// Set the quantity of a product already in the cart. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the product is not in the cart and
    /// `CartError::InvalidQuantity` for negative quantities; nothing is saved
    /// in either case. Returns `CartError::Storage` if the save fails.
    #[instrument(skip(self, owner), fields(user_id = %owner.id))]
    pub async fn set_quantity(
        &self,
        owner: CartOwner,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        self.mutate(owner, |cart| cart.set_quantity(product, quantity))
            .await
    }

    async fn mutate<F>(&self, owner: CartOwner, apply: F) -> Result<Cart, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError> + Send,
    {
        let mut cart = normalize(&owner.cart_items);
        apply(&mut cart)?;

        self.store.save_cart(owner.id, &cart).await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to save cart");
        })?;

        tracing::debug!(
            lines = cart.len(),
            units = cart.total_quantity(),
            "cart saved"
        );
        Ok(cart)
    }
}
