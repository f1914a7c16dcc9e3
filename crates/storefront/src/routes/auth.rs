//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::cart::CartLine;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::session_keys;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// `POST /auth/login` - log in with username and password.
///
/// On success the session carries the user identity; subsequent cart
/// requests hydrate against the user's remote cart.
#[instrument(skip(state, session, body), fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.fakestore());
    let user = auth.login(&body.username, &body.password).await?;

    // Rotate the session ID on privilege change
    session.cycle_id().await?;
    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(&user.email));

    info!(user_id = %user.id, "User logged in");
    Ok(Json(user))
}

/// `POST /auth/logout` - log out.
///
/// Clears the user identity and the persisted cart blob; the next session
/// starts as a guest with an empty cart.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session).await?;
    session.remove::<Vec<CartLine>>(session_keys::CART).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}
