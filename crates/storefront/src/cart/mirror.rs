//! Advisory remote cart mirror.
//!
//! For authenticated sessions the cart is mirrored to the remote cart
//! resource keyed by user identity. The mirror is strictly advisory:
//! pushes are wholesale replacements (last write wins, no versioning) and
//! failures surface only as a notification, never as a rollback.

use std::future::Future;

use chrono::Utc;

use bramble_core::UserId;

use crate::fakestore::{ApiError, FakeStoreClient, RemoteCart, RemoteCartEntry};

/// Remote mirror of the cart's `{product_id, quantity}` projection.
pub trait CartMirror: Send + Sync {
    /// Fetch the remote entries for a user; empty if the user has no cart.
    fn fetch(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<RemoteCartEntry>, ApiError>> + Send;

    /// Wholesale-replace the remote cart with the given entries.
    fn push(
        &self,
        user_id: UserId,
        entries: Vec<RemoteCartEntry>,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Production mirror over the store API's `/carts` endpoints.
#[derive(Clone)]
pub struct RemoteCartMirror {
    client: FakeStoreClient,
}

impl RemoteCartMirror {
    /// Create a mirror over the shared API client.
    #[must_use]
    pub const fn new(client: FakeStoreClient) -> Self {
        Self { client }
    }
}

impl CartMirror for RemoteCartMirror {
    async fn fetch(&self, user_id: UserId) -> Result<Vec<RemoteCartEntry>, ApiError> {
        let cart = self.client.get_user_cart(user_id).await?;
        Ok(cart.map(|c| c.products).unwrap_or_default())
    }

    async fn push(&self, user_id: UserId, entries: Vec<RemoteCartEntry>) -> Result<(), ApiError> {
        let cart = RemoteCart {
            id: None,
            user_id,
            date: Utc::now(),
            products: entries,
        };
        self.client.save_cart(&cart).await?;
        Ok(())
    }
}
