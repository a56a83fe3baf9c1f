//! Authentication extractors.
//!
//! Handlers declare their access requirement by taking [`CurrentUser`] or
//! [`RequireAdmin`] as an argument. The extractor verifies the credential
//! cookie and loads the user; a missing, invalid, or expired token rejects
//! with 401, and a non-admin behind [`RequireAdmin`] rejects with 403.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::db::{RepositoryError, UserRepository};
use crate::error::AppError;
use crate::middleware::cookie::token_from_cookie_header;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     Json(user)
/// }
/// ```
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(Self)
    }
}

/// Extractor that requires an authenticated admin.
///
/// Authentication failures reject with 401; an authenticated customer
/// rejects with 403.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden("admin role required".to_string()));
        }

        Ok(Self(user))
    }
}

/// Verify the credential cookie and resolve it to a stored user.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let token = parts
        .headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_cookie_header)
        .ok_or_else(|| AppError::Unauthorized("missing credential cookie".to_string()))?;

    let subject = state.codec().verify(token)?;

    // A verified token whose subject no longer exists (deleted account) is
    // still a rejection, not a server error.
    let user = UserRepository::new(state.pool())
        .get_by_id(subject)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::Unauthorized("unknown subject".to_string()),
            other => AppError::Database(other),
        })?
        .ok_or_else(|| AppError::Unauthorized("unknown subject".to_string()))?;

    Ok(user)
}
