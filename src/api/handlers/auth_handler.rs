//! Authentication handlers: sign-up, sign-in and sign-out over an HttpOnly cookie.

use std::fmt;

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::responses::{MessageResponse, UserEnvelope};
use super::trim;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::{
    Config, AUTH_COOKIE_NAME, MSG_USER_REGISTERED, MSG_USER_SIGNED_IN, MSG_USER_SIGNED_OUT,
};
use crate::domain::{User, UserRole};
use crate::errors::AppResult;

/// User registration request
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    /// User display name
    #[validate(length(
        min = 2,
        max = 255,
        message = "Name must be between 2 and 255 characters"
    ))]
    #[serde(deserialize_with = "trim::string")]
    #[schema(example = "John Doe")]
    pub name: String,
    /// User email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    #[serde(deserialize_with = "trim::string")]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (6 to 128 characters)
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6 and 128 characters"
    ))]
    #[schema(example = "secret123", min_length = 6, max_length = 128)]
    pub password: String,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// User sign-in request
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[serde(deserialize_with = "trim::string")]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
}

/// Issue a token for `user` and add it to the jar as the auth cookie.
fn with_auth_cookie(state: &AppState, jar: CookieJar, user: &User) -> AppResult<CookieJar> {
    let token = state.auth_service.issue_token(user)?;
    Ok(jar.add(auth_cookie(&state.config, token.access_token, token.expires_in)))
}

fn auth_cookie(config: &Config, token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Register a new user and sign them in
#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    tag = "Authentication",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered, auth cookie set", body = UserEnvelope),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::errors::ErrorResponse)
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignUpRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<UserEnvelope>)> {
    let user = state
        .auth_service
        .register(payload.name, payload.email, payload.password, UserRole::User)
        .await?;

    let jar = with_auth_cookie(&state, jar, &user)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserEnvelope::new(MSG_USER_REGISTERED, user)),
    ))
}

/// Check credentials and set the auth cookie
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    tag = "Authentication",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, auth cookie set", body = UserEnvelope),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid email or password", body = crate::errors::ErrorResponse)
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignInRequest>,
) -> AppResult<(CookieJar, Json<UserEnvelope>)> {
    let user = state
        .auth_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    let jar = with_auth_cookie(&state, jar, &user)?;

    Ok((jar, Json(UserEnvelope::new(MSG_USER_SIGNED_IN, user))))
}

/// Clear the auth cookie
#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    tag = "Authentication",
    responses(
        (status = 200, description = "Auth cookie cleared", body = MessageResponse)
    )
)]
pub async fn sign_out(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE_NAME).path("/"));

    (jar, Json(MessageResponse::new(MSG_USER_SIGNED_OUT)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_flags() {
        let mut config = Config::with_jwt_secret("test-secret-key-at-least-32-chars-long");
        config.cookie_secure = true;

        let cookie = auth_cookie(&config, "abc".to_string(), 3600);
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
    }

    #[test]
    fn test_sign_up_rules() {
        let bad: SignUpRequest =
            serde_json::from_str(r#"{"name":"A","email":"nope","password":"123"}"#).unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));

        let good: SignUpRequest = serde_json::from_str(
            r#"{"name":"Alice","email":"alice@example.com","password":"secret123"}"#,
        )
        .unwrap();
        assert!(good.validate().is_ok());
        assert!(!format!("{:?}", good).contains("secret123"));
    }

    #[test]
    fn test_name_and_email_are_trimmed_before_rules() {
        let padded: SignUpRequest = serde_json::from_str(
            r#"{"name":"  Alice ","email":" Alice@Example.com ","password":"secret123"}"#,
        )
        .unwrap();
        assert!(padded.validate().is_ok());
        assert_eq!(padded.name, "Alice");
        assert_eq!(padded.email, "Alice@Example.com");

        let short: SignUpRequest = serde_json::from_str(
            r#"{"name":" a ","email":"alice@example.com","password":"secret123"}"#,
        )
        .unwrap();
        assert!(short.validate().unwrap_err().field_errors().contains_key("name"));

        let sign_in: SignInRequest =
            serde_json::from_str(r#"{"email":"  alice@example.com\n","password":"x"}"#).unwrap();
        assert!(sign_in.validate().is_ok());
    }
}
