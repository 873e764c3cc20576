//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Field name used for errors that are not tied to a single field
/// (malformed JSON, struct-level rules).
pub const BODY_FIELD: &str = "body";

/// A single schema violation reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Offending field
    #[schema(example = "email")]
    pub field: String,
    /// Human-readable reason
    #[schema(example = "Invalid email format")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Access denied")]
    Forbidden,

    #[error("Only admin can change role")]
    RoleChangeForbidden,

    // Resource errors
    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    // External service errors
    #[error("Database error: {0}")]
    Database(DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Short error summary
    #[schema(example = "Validation failed")]
    pub error: String,
    /// Extra context for authentication failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_message: None,
            details: None,
        }
    }
}

impl AppError {
    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::Jwt(_) | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::RoleChangeForbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the client-facing body (hides internal details)
    fn body(self) -> ErrorResponse {
        match self {
            AppError::Validation(details) => ErrorResponse {
                details: Some(details),
                ..ErrorResponse::new("Validation failed")
            },
            AppError::Unauthorized => ErrorResponse::new("Unauthorized"),
            AppError::Jwt(e) => {
                tracing::debug!(error = ?e, "JWT verification failed");
                ErrorResponse {
                    error_message: Some("Invalid or expired token".to_string()),
                    ..ErrorResponse::new("Unauthorized")
                }
            }
            AppError::InvalidCredentials => ErrorResponse::new("Invalid email or password"),
            AppError::Forbidden => ErrorResponse::new("Forbidden"),
            AppError::RoleChangeForbidden => {
                ErrorResponse::new("Forbidden: only admin can change role")
            }
            AppError::NotFound => ErrorResponse::new("User not found"),
            AppError::Conflict(msg) => ErrorResponse::new(msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ErrorResponse::new("Internal server error")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::new("Internal server error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::conflict("User with this email already exists")
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = if field == "__all__" { BODY_FIELD } else { field };
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    FieldError::new(field, message)
                })
            })
            .collect();

        // HashMap iteration order is unstable
        details.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(details)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    /// Single-field validation failure
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_lists_details() {
        let (status, body) =
            body_json(AppError::invalid_field("id", "ID must be a valid number")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "id");
        assert_eq!(body["details"][0]["message"], "ID must be a valid number");
    }

    #[tokio::test]
    async fn test_unauthorized_has_no_details() {
        let (status, body) = body_json(AppError::Unauthorized).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        assert!(body.get("details").is_none());
        assert!(body.get("error_message").is_none());
    }

    #[tokio::test]
    async fn test_role_change_forbidden_message() {
        let (status, body) = body_json(AppError::RoleChangeForbidden).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden: only admin can change role");
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let (status, body) =
            body_json(AppError::Database(DbErr::Custom("relation users does not exist".into())))
                .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("relation"));
    }

    #[test]
    fn test_not_found_option_ext() {
        let missing: Option<i32> = None;
        assert!(matches!(missing.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(1).ok_or_not_found().unwrap(), 1);
    }
}
