//! User and authentication route handlers.
//!
//! Registration and login respond with the user's public profile and
//! install the credential cookie; logout clears it. Admin user management
//! lives here too, behind [`RequireAdmin`].

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use tamarind_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{
    CurrentUser, RequireAdmin, clear_credential_cookie, credential_cookie,
};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request body. Omitted password keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

/// Admin user update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/users` - register a new account and sign in.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .register(&body.name, &body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(signed_in_response(&state, StatusCode::CREATED, user))
}

/// `POST /api/users/login` - authenticate and sign in.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(signed_in_response(&state, StatusCode::OK, user))
}

/// `POST /api/users/logout` - clear the credential cookie.
///
/// Tokens are stateless, so "logout" is purely the browser forgetting the
/// cookie. Works without authentication.
pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_credential_cookie())],
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

/// `GET /api/users/profile` - the authenticated user's own profile.
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// `PUT /api/users/profile` - update the authenticated user's own profile.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let updated = AuthService::new(state.pool())
        .update_profile(user.id, &body.name, &body.email, body.password.as_deref())
        .await?;

    Ok(Json(updated))
}

/// `GET /api/users` - list all users (admin).
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// `GET /api/users/{id}` - fetch one user (admin).
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(Json(user))
}

/// `PUT /api/users/{id}` - update a user, including the admin flag (admin).
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(body): Json<AdminUpdateUserRequest>,
) -> Result<Json<User>> {
    let email = tamarind_core::Email::parse(&body.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let user = UserRepository::new(state.pool())
        .update(id, &body.name, &email, Role::from_is_admin(body.is_admin))
        .await?;

    Ok(Json(user))
}

/// `DELETE /api/users/{id}` - delete a user (admin).
///
/// Admin accounts cannot be deleted this way; demote them first.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<serde_json::Value>> {
    let repo = UserRepository::new(state.pool());

    let target = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if target.role.is_admin() {
        return Err(AppError::BadRequest("Cannot delete admin user".to_string()));
    }

    if !repo.delete(id).await? {
        return Err(AppError::NotFound("User".to_string()));
    }

    tracing::info!(user_id = %id, "user deleted");
    Ok(Json(json!({ "message": "User removed" })))
}

/// Respond with the user's profile and install their credential cookie.
fn signed_in_response(state: &AppState, status: StatusCode, user: User) -> Response {
    let token = state.codec().issue(user.id);

    (
        status,
        [(header::SET_COOKIE, credential_cookie(&token))],
        Json(user),
    )
        .into_response()
}
