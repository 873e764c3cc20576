//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, responses, user_handler};
use crate::config::AUTH_COOKIE_NAME;
use crate::domain::{UserResponse, UserRole};
use crate::errors::{ErrorResponse, FieldError};

/// OpenAPI documentation for the User Admin API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Admin API",
        version = "0.1.0",
        description = "User management REST API with cookie-based JWT authentication"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::sign_up,
        auth_handler::sign_in,
        auth_handler::sign_out,
        user_handler::fetch_all_users,
        user_handler::get_user_by_id,
        user_handler::update_user,
        user_handler::delete_user,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            auth_handler::SignUpRequest,
            auth_handler::SignInRequest,
            user_handler::UpdateUserRequest,
            responses::MessageResponse,
            responses::UserEnvelope,
            responses::UserListResponse,
            ErrorResponse,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-up, sign-in and sign-out"),
        (name = "Users", description = "User management operations")
    )
)]
pub struct ApiDoc;

/// Registers the `token` cookie as the auth scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_COOKIE_NAME,
                    "JWT set by /api/auth/sign-in",
                ))),
            );
        }
    }
}
