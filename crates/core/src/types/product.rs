//! Catalog product as seen by the cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product record from the catalog.
///
/// The cart never stores these; they are fetched fresh on every cart read
/// so names, prices and images always reflect the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Image URL, if one has been uploaded.
    pub image: Option<String>,
    /// Category slug (e.g., "jeans", "t-shirts").
    pub category: String,
    /// Whether the product is featured on the home page.
    pub is_featured: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
