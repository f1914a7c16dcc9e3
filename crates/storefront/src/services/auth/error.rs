//! Authentication error types.

use thiserror::Error;

use crate::fakestore::ApiError;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The username or password was rejected by the store API.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login succeeded but the username has no entry in the user directory.
    #[error("User profile not found")]
    ProfileNotFound,

    /// The store API request failed.
    #[error("Store API error: {0}")]
    Api(ApiError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        // The login endpoint reports bad credentials as a client error
        match err {
            ApiError::Status { status, .. } if status == 401 || status == 403 => {
                Self::InvalidCredentials
            }
            ApiError::NotFound(_) => Self::InvalidCredentials,
            other => Self::Api(other),
        }
    }
}
