//! Integration test support for Cartkeeper.
//!
//! Provides in-memory implementations of the cart ports so the cart service
//! and the HTTP API can be exercised end to end without `PostgreSQL`.
//!
//! # Test Categories
//!
//! - `cart_service` - Cart operations through `CartService`
//! - `storefront_cart_api` - The `/api/cart` routes through the axum router

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;

use cartkeeper_core::{
    Cart, CartOwner, CartStore, Catalog, CatalogError, Product, ProductId, StorageError, UserId,
};

/// Build a catalog product with predictable attributes.
#[must_use]
pub fn product(id: i32, name: &str, cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name} description"),
        price: Decimal::new(cents, 2),
        image: Some(format!("https://cdn.example.com/{id}.jpg")),
        category: "jeans".to_string(),
        is_featured: false,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory product catalog.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<Vec<Product>>,
    fail: Mutex<bool>,
}

impl InMemoryCatalog {
    /// A catalog holding `products`, returned in insertion order.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            fail: Mutex::new(false),
        }
    }

    /// Delete a product, as an admin would.
    pub fn remove(&self, id: ProductId) {
        self.products.lock().unwrap().retain(|p| p.id != id);
    }

    /// Make every subsequent lookup fail.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        if *self.fail.lock().unwrap() {
            return Err(CatalogError("catalog unavailable".into()));
        }
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

/// In-memory user store holding raw cart JSON per user.
#[derive(Default)]
pub struct InMemoryCartStore {
    carts: Mutex<HashMap<UserId, Value>>,
    saves: Mutex<usize>,
    fail: Mutex<bool>,
}

impl InMemoryCartStore {
    /// Create a user with a raw stored cart.
    pub fn insert(&self, user: UserId, cart_items: Value) {
        self.carts.lock().unwrap().insert(user, cart_items);
    }

    /// The raw stored cart for a user.
    #[must_use]
    pub fn raw(&self, user: UserId) -> Option<Value> {
        self.carts.lock().unwrap().get(&user).cloned()
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    /// Make every subsequent save fail.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Load an owner, panicking if the user does not exist.
    #[must_use]
    pub fn owner(&self, user: UserId) -> CartOwner {
        CartOwner {
            id: user,
            cart_items: self.raw(user).unwrap(),
        }
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load_owner(&self, user: UserId) -> Result<Option<CartOwner>, StorageError> {
        Ok(self.raw(user).map(|cart_items| CartOwner {
            id: user,
            cart_items,
        }))
    }

    async fn save_cart(&self, user: UserId, cart: &Cart) -> Result<(), StorageError> {
        if *self.fail.lock().unwrap() {
            return Err(StorageError::Backend("write timed out".into()));
        }
        let mut carts = self.carts.lock().unwrap();
        let Some(slot) = carts.get_mut(&user) else {
            return Err(StorageError::OwnerNotFound(user));
        };
        *slot = cart.to_raw();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    async fn replace_cart(
        &self,
        user: UserId,
        expected: &Value,
        cart: &Cart,
    ) -> Result<bool, StorageError> {
        if *self.fail.lock().unwrap() {
            return Err(StorageError::Backend("write timed out".into()));
        }
        let mut carts = self.carts.lock().unwrap();
        match carts.get_mut(&user) {
            Some(slot) if slot == expected => {
                *slot = cart.to_raw();
                *self.saves.lock().unwrap() += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
