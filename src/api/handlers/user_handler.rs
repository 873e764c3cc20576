//! User management handlers.

use std::fmt;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::responses::{MessageResponse, UserEnvelope, UserListResponse};
use super::trim;
use crate::api::extractors::{UserId, ValidatedJson};
use crate::api::middleware::{
    auth_middleware, require_admin_for_role_change, require_identity, require_self_or_admin,
    CurrentUser,
};
use crate::api::AppState;
use crate::config::{
    is_valid_role, MSG_USERS_RETRIEVED, MSG_USER_DELETED, MSG_USER_RETRIEVED, MSG_USER_UPDATED,
};
use crate::domain::{UpdateUser, UserResponse, UserRole};
use crate::errors::AppResult;

/// Partial update request; at least one field is required
#[derive(Deserialize, Validate, ToSchema)]
#[validate(schema(function = "require_any_field"))]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(
        min = 2,
        max = 255,
        message = "Name must be between 2 and 255 characters"
    ))]
    #[serde(default, deserialize_with = "trim::option")]
    #[schema(example = "Bob")]
    pub name: Option<String>,
    /// New email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    #[serde(default, deserialize_with = "trim::option")]
    #[schema(example = "bob@example.com")]
    pub email: Option<String>,
    /// New role (admin only)
    #[validate(custom(function = "validate_role"))]
    #[schema(example = "admin")]
    pub role: Option<String>,
    /// New password
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6 and 128 characters"
    ))]
    pub password: Option<String>,
}

impl fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            name: req.name,
            email: req.email,
            role: req.role.as_deref().and_then(UserRole::parse),
            password: req.password,
        }
    }
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if is_valid_role(role) {
        Ok(())
    } else {
        Err(ValidationError::new("role")
            .with_message("Role must be either 'user' or 'admin'".into()))
    }
}

fn require_any_field(req: &UpdateUserRequest) -> Result<(), ValidationError> {
    if req.name.is_none() && req.email.is_none() && req.role.is_none() && req.password.is_none()
    {
        return Err(ValidationError::new("empty_update")
            .with_message("At least one field must be provided for update".into()));
    }
    Ok(())
}

/// Create user routes; PUT and DELETE sit behind the auth middleware.
pub fn user_routes(state: AppState) -> Router<AppState> {
    let protected = put(update_user)
        .delete(delete_user)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(fetch_all_users))
        .route("/:id", get(get_user_by_id).merge(protected))
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn fetch_all_users(State(state): State<AppState>) -> AppResult<Json<UserListResponse>> {
    let users: Vec<UserResponse> = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        message: MSG_USERS_RETRIEVED.to_string(),
        count: users.len(),
        users,
    }))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserEnvelope),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<Json<UserEnvelope>> {
    let user = state.user_service.get_user(id).await?;

    Ok(Json(UserEnvelope::new(MSG_USER_RETRIEVED, user)))
}

/// Update user (self, or any user as admin; only admins may change roles)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserEnvelope),
        (status = 400, description = "Invalid id or body", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not allowed", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::errors::ErrorResponse)
    ),
    security(("cookie_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    current: Option<Extension<CurrentUser>>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserEnvelope>> {
    let caller = require_identity(current)?;
    require_self_or_admin(&caller, id)?;
    require_admin_for_role_change(&caller, payload.role.is_some())?;

    if caller.id == id {
        tracing::info!("User {} updating own record", id);
    } else {
        tracing::info!("Updating user {} by admin {}", id, caller.id);
    }

    let user = state.user_service.update_user(id, payload.into()).await?;

    Ok(Json(UserEnvelope::new(MSG_USER_UPDATED, user)))
}

/// Delete user (self, or any user as admin)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not allowed", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("cookie_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    current: Option<Extension<CurrentUser>>,
) -> AppResult<Json<MessageResponse>> {
    let caller = require_identity(current)?;
    require_self_or_admin(&caller, id)?;

    let deleted = state.user_service.delete_user(id).await?;
    tracing::info!("User {} ({}) deleted by {}", deleted.id, deleted.email, caller.id);

    Ok(Json(MessageResponse::new(MSG_USER_DELETED)))
}
