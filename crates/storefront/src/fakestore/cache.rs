//! Cache types for catalog API responses.
//!
//! Only immutable catalog reads are cached; carts and users are mutable
//! per-user state and always go to the network.

use crate::fakestore::types::Product;

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<String>),
}
