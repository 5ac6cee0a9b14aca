//! User repository for cart storage.
//!
//! The cart lives on the user row as `cart_items` JSONB. This repository only
//! reads and writes that column; account data belongs to the auth service.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use cartkeeper_core::{Cart, CartOwner, CartStore, StorageError, UserId};

use super::RepositoryError;

/// Row shape for a user's cart column.
#[derive(Debug, sqlx::FromRow)]
struct CartOwnerRow {
    id: UserId,
    cart_items: Value,
}

impl From<CartOwnerRow> for CartOwner {
    fn from(row: CartOwnerRow) -> Self {
        Self {
            id: row.id,
            cart_items: row.cart_items,
        }
    }
}

/// Repository for user cart database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's stored cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_cart_owner(&self, id: UserId) -> Result<Option<CartOwner>, RepositoryError> {
        let row = sqlx::query_as::<_, CartOwnerRow>(
            r"
            SELECT id, cart_items
            FROM storefront.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CartOwner::from))
    }

    /// List stored carts in ID order, starting after `after`.
    ///
    /// Used for keyset pagination over every user when bulk-healing carts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_cart_owners(
        &self,
        after: Option<UserId>,
        limit: i64,
    ) -> Result<Vec<CartOwner>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartOwnerRow>(
            r"
            SELECT id, cart_items
            FROM storefront.user
            WHERE $1::INT4 IS NULL OR id > $1
            ORDER BY id
            LIMIT $2
            ",
        )
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CartOwner::from).collect())
    }

    /// Overwrite a user's stored cart.
    ///
    /// Returns `false` if no user has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn save_cart_items(
        &self,
        id: UserId,
        cart_items: &Value,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.user
            SET cart_items = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(cart_items)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite a user's stored cart only if it still holds `expected`.
    ///
    /// JSONB equality ignores key order and whitespace, so `expected` can be
    /// the value returned by an earlier read. Returns `false` if the row
    /// changed in between or no user has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn replace_cart_items(
        &self,
        id: UserId,
        expected: &Value,
        cart_items: &Value,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.user
            SET cart_items = $3, updated_at = NOW()
            WHERE id = $1 AND cart_items = $2
            ",
        )
        .bind(id)
        .bind(expected)
        .bind(cart_items)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CartStore for UserRepository {
    async fn load_owner(&self, user: UserId) -> Result<Option<CartOwner>, StorageError> {
        Ok(self.get_cart_owner(user).await?)
    }

    async fn save_cart(&self, user: UserId, cart: &Cart) -> Result<(), StorageError> {
        if self.save_cart_items(user, &cart.to_raw()).await? {
            Ok(())
        } else {
            Err(StorageError::OwnerNotFound(user))
        }
    }

    async fn replace_cart(
        &self,
        user: UserId,
        expected: &Value,
        cart: &Cart,
    ) -> Result<bool, StorageError> {
        Ok(self
            .replace_cart_items(user, expected, &cart.to_raw())
            .await?)
    }
}
