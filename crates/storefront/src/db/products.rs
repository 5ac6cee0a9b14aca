//! Product catalog lookups.

use async_trait::async_trait;
use sqlx::PgPool;

use cartkeeper_core::{Catalog, CatalogError, Product, ProductId};

use super::RepositoryError;

/// Read-only repository over `storefront.product`.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get every product whose ID is in `ids`.
    ///
    /// Missing IDs are skipped; results come back in ID order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, image, category, is_featured,
                   created_at, updated_at
            FROM storefront.product
            WHERE id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

#[async_trait]
impl Catalog for ProductRepository {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        Ok(self.get_by_ids(ids).await?)
    }
}
