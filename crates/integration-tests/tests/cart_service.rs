//! Integration tests for cart operations through `CartService`.
//!
//! These use in-memory ports, so they cover normalization, mutation,
//! persistence and reconciliation together without a database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;

use cartkeeper_core::{CartError, CartService, ProductId, StorageError, UserId};
use cartkeeper_integration_tests::{InMemoryCartStore, InMemoryCatalog, product};

const USER: UserId = UserId::new(1);
const JEANS: ProductId = ProductId::new(10);
const TEE: ProductId = ProductId::new(20);
const CAP: ProductId = ProductId::new(30);

struct Fixture {
    catalog: Arc<InMemoryCatalog>,
    store: Arc<InMemoryCartStore>,
    service: CartService,
}

fn fixture(stored: serde_json::Value) -> Fixture {
    let catalog = Arc::new(InMemoryCatalog::with_products(vec![
        product(10, "Jeans", 5999),
        product(20, "Tee", 1999),
        product(30, "Cap", 2499),
    ]));
    let store = Arc::new(InMemoryCartStore::default());
    store.insert(USER, stored);
    let service = CartService::new(catalog.clone(), store.clone());
    Fixture {
        catalog,
        store,
        service,
    }
}

// =============================================================================
// End-to-end Scenario
// =============================================================================

#[tokio::test]
async fn test_legacy_cart_lifecycle() {
    let f = fixture(json!([10]));

    f.service.add(f.store.owner(USER), TEE).await.unwrap();
    f.service
        .set_quantity(f.store.owner(USER), JEANS, 3)
        .await
        .unwrap();
    let cart = f
        .service
        .remove_all(f.store.owner(USER), Some(TEE))
        .await
        .unwrap();

    assert_eq!(cart.to_raw(), json!([{ "product": 10, "quantity": 3 }]));
    assert_eq!(f.store.raw(USER), Some(cart.to_raw()));
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_twice_increments() {
    let f = fixture(json!([]));

    let cart = f.service.add(f.store.owner(USER), JEANS).await.unwrap();
    assert_eq!(cart.to_raw(), json!([{ "product": 10, "quantity": 1 }]));

    let cart = f.service.add(f.store.owner(USER), JEANS).await.unwrap();
    assert_eq!(cart.to_raw(), json!([{ "product": 10, "quantity": 2 }]));
}

#[tokio::test]
async fn test_add_product_not_in_catalog_is_stored() {
    // The cart does not validate against the catalog on write.
    let f = fixture(json!([]));
    let cart = f
        .service
        .add(f.store.owner(USER), ProductId::new(999))
        .await
        .unwrap();
    assert_eq!(cart.len(), 1);

    // ...but reads skip it.
    let items = f.service.get(f.store.owner(USER)).await.unwrap();
    assert!(items.is_empty());
}

// =============================================================================
// Remove
// =============================================================================

#[tokio::test]
async fn test_remove_all_without_product_clears() {
    let f = fixture(json!([{ "product": 10, "quantity": 4 }, 20]));
    let cart = f.service.remove_all(f.store.owner(USER), None).await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(f.store.raw(USER), Some(json!([])));
}

#[tokio::test]
async fn test_remove_missing_product_is_noop() {
    let f = fixture(json!([{ "product": 10, "quantity": 4 }]));
    let cart = f
        .service
        .remove_all(f.store.owner(USER), Some(CAP))
        .await
        .unwrap();
    assert_eq!(cart.to_raw(), json!([{ "product": 10, "quantity": 4 }]));
}

// =============================================================================
// Set Quantity
// =============================================================================

#[tokio::test]
async fn test_set_quantity_leaves_other_lines() {
    let f = fixture(json!([
        { "product": 10, "quantity": 2 },
        { "product": 20, "quantity": 1 },
    ]));
    let cart = f
        .service
        .set_quantity(f.store.owner(USER), JEANS, 5)
        .await
        .unwrap();
    assert_eq!(
        cart.to_raw(),
        json!([{ "product": 10, "quantity": 5 }, { "product": 20, "quantity": 1 }])
    );
}

#[tokio::test]
async fn test_set_quantity_zero_removes() {
    let f = fixture(json!([{ "product": 10, "quantity": 2 }, 20]));
    let cart = f
        .service
        .set_quantity(f.store.owner(USER), JEANS, 0)
        .await
        .unwrap();
    assert_eq!(cart.to_raw(), json!([{ "product": 20, "quantity": 1 }]));
}

#[tokio::test]
async fn test_set_quantity_missing_line_is_not_found() {
    let f = fixture(json!([20]));
    let err = f
        .service
        .set_quantity(f.store.owner(USER), JEANS, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::LineNotFound(id) if id == JEANS));
    // Nothing was written, so the legacy shape is still stored.
    assert_eq!(f.store.raw(USER), Some(json!([20])));
    assert_eq!(f.store.saves(), 0);
}

#[tokio::test]
async fn test_set_quantity_negative_rejected() {
    let f = fixture(json!([10]));
    let err = f
        .service
        .set_quantity(f.store.owner(USER), JEANS, -2)
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::InvalidQuantity(-2)));
    assert_eq!(f.store.saves(), 0);
}

// =============================================================================
// Read / Reconcile
// =============================================================================

#[tokio::test]
async fn test_get_joins_live_product_data() {
    let f = fixture(json!([{ "product": 20, "quantity": 2 }, 10]));
    let items = f.service.get(f.store.owner(USER)).await.unwrap();

    let got: Vec<(&str, u32)> = items
        .iter()
        .map(|item| (item.product.name.as_str(), item.quantity))
        .collect();
    // Catalog order (Jeans before Tee), not cart order.
    assert_eq!(got, vec![("Jeans", 1), ("Tee", 2)]);
}

#[tokio::test]
async fn test_get_skips_deleted_products() {
    let f = fixture(json!([10, 20]));
    f.catalog.remove(TEE);

    let items = f.service.get(f.store.owner(USER)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|item| item.product.id == JEANS));

    // The stale line stays in storage; only the view drops it.
    let stored = f.store.raw(USER).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_heals_legacy_shape() {
    let f = fixture(json!([10, "20"]));
    f.service.get(f.store.owner(USER)).await.unwrap();

    assert_eq!(
        f.store.raw(USER),
        Some(json!([{ "product": 10, "quantity": 1 }, { "product": 20, "quantity": 1 }]))
    );

    // Canonical carts are not rewritten on read.
    f.service.get(f.store.owner(USER)).await.unwrap();
    assert_eq!(f.store.saves(), 1);
}

#[tokio::test]
async fn test_get_catalog_failure() {
    let f = fixture(json!([{ "product": 10, "quantity": 1 }]));
    f.catalog.set_failing(true);

    let err = f.service.get(f.store.owner(USER)).await.unwrap_err();
    assert!(matches!(err, CartError::Catalog(_)));
}

// =============================================================================
// Storage Failures
// =============================================================================

#[tokio::test]
async fn test_storage_failure_discards_mutation() {
    let f = fixture(json!([{ "product": 10, "quantity": 1 }]));
    f.store.set_failing(true);

    let err = f.service.add(f.store.owner(USER), JEANS).await.unwrap_err();
    assert!(matches!(err, CartError::Storage(StorageError::Backend(_))));
    assert_eq!(
        f.store.raw(USER),
        Some(json!([{ "product": 10, "quantity": 1 }]))
    );
}

#[tokio::test]
async fn test_deleted_owner_surfaces_storage_error() {
    let f = fixture(json!([]));
    let ghost = cartkeeper_core::CartOwner::new(UserId::new(404));

    let err = f.service.add(ghost, JEANS).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::Storage(StorageError::OwnerNotFound(id)) if id == UserId::new(404)
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

/// Two adds that load the same record before either saves: the later save
/// wins and one increment is lost. Last-write-wins is the store's contract.
#[tokio::test]
async fn test_concurrent_adds_are_last_write_wins() {
    let f = fixture(json!([{ "product": 10, "quantity": 1 }]));
    let first = f.store.owner(USER);
    let second = f.store.owner(USER);

    f.service.add(first, JEANS).await.unwrap();
    f.service.add(second, JEANS).await.unwrap();

    assert_eq!(
        f.store.raw(USER),
        Some(json!([{ "product": 10, "quantity": 2 }]))
    );
}
