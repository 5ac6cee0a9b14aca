//! Joining a cart with the live catalog.

use std::collections::HashMap;

use super::{Cart, CartItem, Catalog, CatalogError};
use crate::types::{Product, ProductId};

/// Fetch the cart's products and attach quantities.
///
/// Products that no longer exist are dropped without error. The result
/// follows the catalog's ordering, not the cart's.
///
/// # Errors
///
/// Returns `CatalogError` if the catalog lookup fails.
pub async fn reconcile(cart: &Cart, catalog: &dyn Catalog) -> Result<Vec<CartItem>, CatalogError> {
    let ids = cart.product_ids();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let products = catalog.find_by_ids(&ids).await?;
    let items = join_catalog(cart, products);

    let missing = ids.len().saturating_sub(items.len());
    if missing > 0 {
        tracing::debug!(missing, "skipping cart lines for products no longer in the catalog");
    }

    Ok(items)
}

/// Pair each product with its cart quantity.
///
/// One item per product. When a product appears on several lines the last
/// line's quantity is used; a product missing from the cart gets 1.
#[must_use]
pub fn join_catalog(cart: &Cart, products: Vec<Product>) -> Vec<CartItem> {
    let quantities: HashMap<ProductId, u32> = cart
        .lines()
        .iter()
        .map(|line| (line.product, line.quantity))
        .collect();

    products
        .into_iter()
        .map(|product| {
            let quantity = quantities.get(&product.id).copied().unwrap_or(1);
            CartItem { product, quantity }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::CartLine;

    fn product(id: i32) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::new(1999, 2),
            image: None,
            category: "jeans".to_string(),
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn cart(lines: &[(i32, u32)]) -> Cart {
        Cart::from_lines(lines.iter().map(|&(id, quantity)| CartLine {
            product: ProductId::new(id),
            quantity,
        }))
    }

    /// Catalog that returns its products in reverse ID order and records calls.
    struct FixedCatalog {
        products: Vec<Product>,
        calls: Mutex<Vec<Vec<ProductId>>>,
    }

    impl FixedCatalog {
        fn new(ids: &[i32]) -> Self {
            Self {
                products: ids.iter().copied().map(product).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Catalog for FixedCatalog {
        async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
            self.calls.lock().unwrap().push(ids.to_vec());
            let mut found: Vec<Product> = self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect();
            found.sort_by_key(|p| std::cmp::Reverse(p.id.as_i32()));
            Ok(found)
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl Catalog for BrokenCatalog {
        async fn find_by_ids(&self, _ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
            Err(CatalogError("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn test_reconcile_attaches_quantities() {
        let catalog = FixedCatalog::new(&[1, 2]);
        let items = reconcile(&cart(&[(1, 3), (2, 1)]), &catalog).await.unwrap();

        let got: Vec<(i32, u32)> = items
            .iter()
            .map(|item| (item.product.id.as_i32(), item.quantity))
            .collect();
        // Catalog order, not cart order.
        assert_eq!(got, vec![(2, 1), (1, 3)]);
    }

    #[tokio::test]
    async fn test_reconcile_drops_deleted_products() {
        let catalog = FixedCatalog::new(&[1]);
        let items = reconcile(&cart(&[(1, 2), (5, 4)]), &catalog).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items.iter().all(|item| item.product.id != ProductId::new(5)));
    }

    #[tokio::test]
    async fn test_reconcile_empty_cart_skips_catalog() {
        let catalog = FixedCatalog::new(&[1]);
        let items = reconcile(&Cart::new(), &catalog).await.unwrap();
        assert!(items.is_empty());
        assert!(catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_requests_distinct_ids() {
        let catalog = FixedCatalog::new(&[1, 2]);
        reconcile(&cart(&[(1, 1), (2, 1), (1, 2)]), &catalog)
            .await
            .unwrap();
        let calls = catalog.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[vec![ProductId::new(1), ProductId::new(2)]]);
    }

    #[tokio::test]
    async fn test_reconcile_propagates_catalog_failure() {
        let result = reconcile(&cart(&[(1, 1)]), &BrokenCatalog).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_join_last_duplicate_wins() {
        let items = join_catalog(&cart(&[(1, 2), (1, 7)]), vec![product(1)]);
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().quantity, 7);
    }

    #[test]
    fn test_join_defaults_unmatched_product_to_one() {
        let items = join_catalog(&cart(&[(1, 2)]), vec![product(9)]);
        assert_eq!(items.first().unwrap().quantity, 1);
    }

    #[test]
    fn test_cart_item_serializes_flat() {
        let item = CartItem {
            product: product(4),
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["name"], "Product 4");
        assert_eq!(json["price"], "19.99");
        assert_eq!(json["isFeatured"], false);
        assert_eq!(json["quantity"], 2);
    }
}
