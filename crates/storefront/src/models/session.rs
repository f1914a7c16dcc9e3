//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use bramble_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The user's directory ID.
    pub id: UserId,
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name, when the directory provides one.
    pub name: Option<String>,
}

/// Session keys for persisted state.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the persisted cart blob (the full line list, overwritten
    /// wholesale on every mutation).
    pub const CART: &str = "cart";
}
