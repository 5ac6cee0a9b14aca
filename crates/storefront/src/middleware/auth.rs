//! Signed-in user extractor.
//!
//! Authentication happens elsewhere; by the time a cart request arrives the
//! session either carries a [`CurrentUser`] or it does not. This extractor
//! turns that into the user's [`CartOwner`] record.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::Span;

use cartkeeper_core::{CartError, CartOwner};

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user and loads their cart record.
///
/// Rejects with `401` if there is no user in the session, or if the user
/// row has since been deleted.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(owner): RequireUser) -> impl IntoResponse {
///     format!("user {} has a cart", owner.id)
/// }
/// ```
pub struct RequireUser(pub CartOwner);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?
            .ok_or_else(|| AppError::Unauthorized("no user in session".to_string()))?;

        let owner = state
            .cart_store()
            .load_owner(user.id)
            .await
            .map_err(CartError::from)?
            .ok_or_else(|| AppError::Unauthorized(format!("user {} no longer exists", user.id)))?;

        Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id);

        Ok(Self(owner))
    }
}
