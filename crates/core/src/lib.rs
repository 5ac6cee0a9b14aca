//! Cartkeeper Core - cart domain library.
//!
//! This crate holds everything about a user's cart that does not touch a
//! socket or a database:
//! - `storefront` - HTTP surface and `PostgreSQL` adapters
//! - `cli` - migrations and bulk cart maintenance
//!
//! # Architecture
//!
//! Persistence and catalog lookups are expressed as ports ([`cart::CartStore`]
//! and [`cart::Catalog`]). The storefront crate provides the `PostgreSQL`
//! adapters; tests provide in-memory ones.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and catalog products
//! - [`cart`] - Cart lines, normalization, reconciliation and the cart service

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{
    Cart, CartError, CartItem, CartLine, CartOwner, CartService, CartStore, Catalog, CatalogError,
    StorageError,
};
pub use types::*;
