//! Per-user shopping cart.
//!
//! A cart is an ordered list of `(product, quantity)` lines stored as JSON on
//! the owning user's record. Older records hold a bare list of product IDs;
//! [`normalize`] turns either shape into a [`Cart`], and every operation in
//! [`CartService`] normalizes before it reads or writes so legacy data heals
//! on first touch.
//!
//! # Line invariants
//!
//! - `quantity >= 1` for every stored line. Dropping a quantity to zero
//!   removes the line.
//! - Lines are not deduplicated. `add` and `set_quantity` act on the first
//!   line for a product, `remove_all` and a zero `set_quantity` remove every
//!   line for it, and reconciliation takes the last line's quantity.

mod normalize;
mod ports;
mod reconcile;
mod service;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::types::{Product, ProductId, UserId};

pub use normalize::{Normalized, normalize, normalize_stored};
pub use ports::{CartStore, Catalog, CatalogError, StorageError};
pub use reconcile::{join_catalog, reconcile};
pub use service::CartService;

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// `set_quantity` was called for a product that has no line in the cart.
    #[error("no cart line for product {0}")]
    LineNotFound(ProductId),

    /// `set_quantity` was called with a negative or oversized quantity.
    #[error("invalid quantity {0}: must be between 0 and {max}", max = u32::MAX)]
    InvalidQuantity(i64),

    /// Saving or loading the owning record failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The product catalog could not be queried.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// A single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CartLine {
    /// Product this line refers to.
    pub product: ProductId,
    /// Number of units, always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// A line holding one unit of `product`.
    #[must_use]
    pub const fn single(product: ProductId) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }
}

/// The canonical cart shape.
///
/// Serializes as the JSON array stored on the user record:
/// `[{"product": 1, "quantity": 2}, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines, discarding any with a zero quantity.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        Self {
            lines: lines.into_iter().filter(|line| line.quantity > 0).collect(),
        }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Quantity on the first line for `product`, if any.
    #[must_use]
    pub fn quantity_of(&self, product: ProductId) -> Option<u32> {
        self.find(product).map(|line| line.quantity)
    }

    /// Distinct product IDs, in order of first appearance.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !ids.contains(&line.product) {
                ids.push(line.product);
            }
        }
        ids
    }

    /// The stored JSON representation.
    #[must_use]
    pub fn to_raw(&self) -> Value {
        Value::Array(
            self.lines
                .iter()
                .map(|line| json!({ "product": line.product, "quantity": line.quantity }))
                .collect(),
        )
    }

    /// Add one unit of `product`, appending a new line if it is not in the cart.
    pub fn add(&mut self, product: ProductId) {
        match self.find_mut(product) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::single(product)),
        }
    }

    /// Remove every line for `product`, or clear the cart when `product` is `None`.
    ///
    /// Removing a product that is not in the cart is a no-op.
    pub fn remove_all(&mut self, product: Option<ProductId>) {
        match product {
            Some(product) => self.lines.retain(|line| line.product != product),
            None => self.lines.clear(),
        }
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// A quantity of zero removes the product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the cart has no line for `product`.
    /// Returns `CartError::InvalidQuantity` if `quantity` is negative or does
    /// not fit in a `u32`. The cart is left untouched on error.
    pub fn set_quantity(&mut self, product: ProductId, quantity: i64) -> Result<(), CartError> {
        if self.find(product).is_none() {
            return Err(CartError::LineNotFound(product));
        }

        let quantity = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;
        if quantity == 0 {
            self.remove_all(Some(product));
            return Ok(());
        }

        if let Some(line) = self.find_mut(product) {
            line.quantity = quantity;
        }
        Ok(())
    }

    fn find(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product == product)
    }

    fn find_mut(&mut self, product: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product == product)
    }
}

/// A cart line joined with live catalog data.
///
/// Serializes flat, as the product's fields plus `quantity`. Read-only;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    /// Current catalog record.
    #[serde(flatten)]
    pub product: Product,
    /// Units of this product in the cart.
    pub quantity: u32,
}

/// The user record as the cart sees it.
///
/// `cart_items` is the raw stored value and may be in any historical shape.
#[derive(Debug, Clone, PartialEq)]
pub struct CartOwner {
    /// Owning user.
    pub id: UserId,
    /// Stored cart, not yet normalized.
    pub cart_items: Value,
}

impl CartOwner {
    /// A user with an empty cart, as created at sign-up.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            cart_items: Value::Array(Vec::new()),
        }
    }
}
