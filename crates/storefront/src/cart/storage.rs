//! Persisted cart storage.
//!
//! The persisted form is the full line list serialized as one blob under a
//! fixed key; every save overwrites the previous blob (no diffing).

use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;
use tower_sessions::Session;

use crate::cart::store::CartLine;
use crate::models::session_keys;

/// Errors that can occur reading or writing the persisted cart blob.
///
/// These are never fatal to the cart itself: in-memory state stays
/// authoritative for the session and failures are only logged.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session backend failed.
    #[error("session storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Storage backend for the persisted cart blob.
pub trait CartStorage: Send + Sync {
    /// Load the persisted line list, if any.
    fn load(&self) -> impl Future<Output = Result<Option<Vec<CartLine>>, StorageError>> + Send;

    /// Overwrite the persisted line list.
    fn save(&self, lines: &[CartLine]) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete the persisted blob.
    fn clear(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Session-backed cart storage.
///
/// The session plays the role the browser's local storage plays in a
/// client-side storefront: a per-client key-value blob that survives
/// across requests.
#[derive(Clone)]
pub struct SessionCartStorage {
    session: Session,
}

impl SessionCartStorage {
    /// Wrap a request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStorage {
    async fn load(&self) -> Result<Option<Vec<CartLine>>, StorageError> {
        Ok(self.session.get::<Vec<CartLine>>(session_keys::CART).await?)
    }

    async fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        self.session.insert(session_keys::CART, lines).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.session
            .remove::<Vec<CartLine>>(session_keys::CART)
            .await?;
        Ok(())
    }
}

/// In-memory cart storage.
///
/// Used by tests and by embeddings that run without a session layer.
#[derive(Default)]
pub struct MemoryCartStorage {
    blob: Mutex<Option<Vec<CartLine>>>,
}

impl MemoryCartStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-seeded with a persisted line list.
    #[must_use]
    pub fn seeded(lines: Vec<CartLine>) -> Self {
        Self {
            blob: Mutex::new(Some(lines)),
        }
    }
}

impl CartStorage for MemoryCartStorage {
    async fn load(&self) -> Result<Option<Vec<CartLine>>, StorageError> {
        Ok(self
            .blob
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .clone())
    }

    async fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        *self
            .blob
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))? = Some(lines.to_vec());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self
            .blob
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))? = None;
        Ok(())
    }
}
