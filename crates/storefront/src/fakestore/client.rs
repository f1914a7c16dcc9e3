//! FakeStore API client implementation.
//!
//! Plain REST over `reqwest`. Catalog reads are cached with `moka`
//! (configurable TTL, 5 minutes by default); cart and user reads are
//! per-user mutable state and are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use bramble_core::{ProductId, UserId};

use crate::config::FakeStoreConfig;
use crate::fakestore::ApiError;
use crate::fakestore::cache::CacheValue;
use crate::fakestore::types::{
    ApiUser, Credentials, LoginResponse, Product, RemoteCart,
};

/// Client for the FakeStore REST API.
///
/// Cheaply cloneable via `Arc`; one instance is shared across all handlers.
#[derive(Clone)]
pub struct FakeStoreClient {
    inner: Arc<FakeStoreClientInner>,
}

struct FakeStoreClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl FakeStoreClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &FakeStoreConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            inner: Arc::new(FakeStoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.inner.client.get(self.endpoint(path)).send().await?;
        Self::decode(path, response).await
    }

    /// Execute a POST request with a JSON body and decode the JSON response.
    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %path,
                body = %body.chars().take(500).collect::<String>(),
                "FakeStore API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %path,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse FakeStore API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Catalog Methods (cached)
    // =========================================================================

    /// Get the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        let cache_key = "products".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        // The API answers an unknown product ID with an empty 200 body, which
        // surfaces here as a parse error; report it as not-found instead.
        let product: Product = self
            .get_json(&format!("products/{product_id}"))
            .await
            .map_err(|e| match e {
                ApiError::Parse(_) => ApiError::NotFound(format!("product {product_id}")),
                other => other,
            })?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the list of category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<String>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self.get_json("products/categories").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get the products in one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn get_products_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, ApiError> {
        let cache_key = format!("category:{category}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        // Category names contain spaces and apostrophes ("men's clothing")
        let encoded = urlencoding::encode(category);
        let products: Vec<Product> = self
            .get_json(&format!("products/category/{encoded}"))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Fetch the remote cart for a user.
    ///
    /// Returns `Ok(None)` when the user has no remote cart. The endpoint has
    /// historically answered with either a single cart body or an array of
    /// carts; both shapes are accepted and an array is read as its most
    /// recent entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user_cart(&self, user_id: UserId) -> Result<Option<RemoteCart>, ApiError> {
        let value: serde_json::Value = match self
            .get_json(&format!("carts/user/{user_id}"))
            .await
        {
            Ok(value) => value,
            Err(ApiError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let cart_value = match value {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Array(mut carts) => match carts.pop() {
                Some(last) => last,
                None => return Ok(None),
            },
            other => other,
        };

        let cart: RemoteCart = serde_json::from_value(cart_value)?;
        Ok(Some(cart))
    }

    /// Fetch all remote carts for a user, oldest first.
    ///
    /// Used for the order-history projection on the account page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user_carts(&self, user_id: UserId) -> Result<Vec<RemoteCart>, ApiError> {
        let value: serde_json::Value = match self
            .get_json(&format!("carts/user/{user_id}"))
            .await
        {
            Ok(value) => value,
            Err(ApiError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let carts: Vec<RemoteCart> = match value {
            serde_json::Value::Null => Vec::new(),
            array @ serde_json::Value::Array(_) => serde_json::from_value(array)?,
            single => vec![serde_json::from_value(single)?],
        };
        Ok(carts)
    }

    /// Create or wholesale-replace the remote cart for a user.
    ///
    /// The server assigns the cart ID on the response; the request body
    /// carries only `{userId, date, products}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, cart), fields(user_id = %cart.user_id))]
    pub async fn save_cart(&self, cart: &RemoteCart) -> Result<RemoteCart, ApiError> {
        self.post_json("carts", cart).await
    }

    // =========================================================================
    // User & Auth Methods (not cached)
    // =========================================================================

    /// Authenticate with username and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post_json("auth/login", credentials).await
    }

    /// Get all users in the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<ApiUser>, ApiError> {
        self.get_json("users").await
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: UserId) -> Result<ApiUser, ApiError> {
        self.get_json(&format!("users/{user_id}")).await
    }
}
