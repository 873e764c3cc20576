//! Cookie-based JWT authentication middleware and authorization gates.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::api::AppState;
use crate::config::AUTH_COOKIE_NAME;
use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

/// Authenticated user extracted from the JWT cookie
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// JWT authentication middleware.
///
/// Reads the `token` cookie, verifies it, and injects the CurrentUser
/// into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let Some(cookie) = jar.get(AUTH_COOKIE_NAME) else {
        tracing::warn!(
            path = %request.uri().path(),
            method = %request.method(),
            "Missing auth token"
        );
        return Err(AppError::Unauthorized);
    };

    let claims = match state.auth_service.verify_token(cookie.value()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(
                path = %request.uri().path(),
                method = %request.method(),
                error = %e,
                "Rejected auth token"
            );
            return Err(e);
        }
    };

    request.extensions_mut().insert(CurrentUser {
        id: claims.id,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Unwrap the identity attached by `auth_middleware`.
pub fn require_identity(current: Option<Extension<CurrentUser>>) -> AppResult<CurrentUser> {
    current
        .map(|Extension(user)| user)
        .ok_or(AppError::Unauthorized)
}

/// Allow admins, or a user acting on their own record.
pub fn require_self_or_admin(user: &CurrentUser, target_id: i32) -> AppResult<()> {
    if user.is_admin() || user.id == target_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Only admins may send a `role` field, even an unchanged one.
pub fn require_admin_for_role_change(user: &CurrentUser, role_requested: bool) -> AppResult<()> {
    if role_requested && !user.is_admin() {
        Err(AppError::RoleChangeForbidden)
    } else {
        Ok(())
    }
}
