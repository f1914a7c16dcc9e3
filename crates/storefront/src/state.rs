//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::fakestore::FakeStoreClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; gives handlers access to configuration and
/// the shared store API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    fakestore: FakeStoreClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let fakestore = FakeStoreClient::new(&config.fakestore);

        Self {
            inner: Arc::new(AppStateInner { config, fakestore }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the store API client.
    #[must_use]
    pub fn fakestore(&self) -> &FakeStoreClient {
        &self.inner.fakestore
    }
}
