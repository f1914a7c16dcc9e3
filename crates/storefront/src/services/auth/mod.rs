//! Authentication service.
//!
//! Authenticates against the store API's token endpoint and resolves the
//! logged-in profile from the user directory by username. The token proves
//! the credentials; the directory lookup supplies the identity, so the
//! resolved profile is always the one that actually logged in.

mod error;

pub use error::AuthError;

use tracing::instrument;

use crate::fakestore::{ApiError, Credentials, FakeStoreClient};
use crate::models::CurrentUser;

/// Authentication service.
///
/// Handles login against the store API. Stateless; cheap to construct per
/// request around the shared API client.
pub struct AuthService<'a> {
    client: &'a FakeStoreClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(client: &'a FakeStoreClient) -> Self {
        Self { client }
    }

    /// Log a user in with username and password.
    ///
    /// Obtains a token from the auth endpoint, then resolves the session
    /// identity by matching the username in the user directory.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the credentials are
    /// rejected, `AuthError::ProfileNotFound` if the authenticated username
    /// has no directory entry, or `AuthError::Api` on transport failures.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        // The auth endpoint reports bad credentials as a 4xx with a plain
        // text body rather than a structured error
        self.client.login(&credentials).await.map_err(|e| match e {
            ApiError::Status { status, .. } if (400..500).contains(&status) => {
                AuthError::InvalidCredentials
            }
            other => AuthError::from(other),
        })?;

        let users = self.client.get_users().await?;
        let user = users
            .into_iter()
            .find(|u| u.username == username)
            .ok_or(AuthError::ProfileNotFound)?;

        let name = if user.name.firstname.is_empty() {
            None
        } else {
            Some(format!("{} {}", user.name.firstname, user.name.lastname))
        };

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
            email: user.email,
            name,
        })
    }
}
