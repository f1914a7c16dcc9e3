//! FakeStore API client.
//!
//! # Architecture
//!
//! - The API is plain REST + JSON, so `reqwest` is used directly
//! - The API is the source of truth for catalog data - NO local sync
//! - In-memory caching via `moka` for catalog reads (5 minute TTL)
//!
//! # Resources
//!
//! ## Catalog
//! - Products, single product, categories, products by category
//!
//! ## Carts
//! - Fetch-by-user and wholesale create/replace; advisory only - the
//!   storefront's local cart state never depends on these calls succeeding
//!
//! ## Users & auth
//! - Login (returns an opaque token), user directory lookup
//!
//! # Example
//!
//! ```rust,ignore
//! use bramble_storefront::fakestore::FakeStoreClient;
//!
//! let client = FakeStoreClient::new(&config.fakestore);
//!
//! let products = client.get_products().await?;
//! let product = client.get_product(ProductId::new(1)).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::FakeStoreClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the FakeStore API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status code with no more specific meaning.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");

        let err = ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Unexpected status 502: bad gateway");
    }
}
