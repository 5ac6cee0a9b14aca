//! Core types for Cartkeeper.

pub mod id;
pub mod product;

pub use id::*;
pub use product::Product;
