//! Shared harness for the HTTP integration tests.
//!
//! Drives the real router and services over an in-memory repository.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use user_admin::api::{create_router, AppState};
use user_admin::config::Config;
use user_admin::domain::{DeletedUser, NewUser, User, UserPatch, UserRole};
use user_admin::errors::{AppError, AppResult};
use user_admin::infra::UserRepository;
use user_admin::services::{AuthService, Authenticator, UserManager};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

// =============================================================================
// In-memory repository
// =============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<i32, User>>,
}

impl InMemoryUserRepository {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get(&self, id: i32) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    fn email_taken(users: &BTreeMap<i32, User>, email: &str, except: Option<i32>) -> bool {
        users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if Self::email_taken(&users, &new_user.email, None) {
            return Err(AppError::conflict("User with this email already exists"));
        }

        let id = users.keys().next_back().copied().unwrap_or(0) + 1;
        let user = User {
            id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i32, patch: UserPatch) -> AppResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &patch.email {
            if Self::email_taken(&users, email, Some(id)) {
                return Err(AppError::conflict("User with this email already exists"));
            }
        }

        Ok(users.get_mut(&id).map(|user| {
            patch.apply_to(user);
            user.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<Option<DeletedUser>> {
        let mut users = self.users.lock().unwrap();
        Ok(users.remove(&id).map(|u| DeletedUser {
            id: u.id,
            email: u.email,
        }))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }
}

// =============================================================================
// Test application
// =============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `field` values of the validation details
    pub fn detail_fields(&self) -> Vec<String> {
        self.body["details"]
            .as_array()
            .map(|d| {
                d.iter()
                    .filter_map(|e| e["field"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

pub struct TestApp {
    pub repo: Arc<InMemoryUserRepository>,
    pub auth: Arc<Authenticator>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::with_jwt_secret(TEST_SECRET);
        let repo = Arc::new(InMemoryUserRepository::default());
        let users: Arc<dyn UserRepository> = repo.clone();
        let auth = Arc::new(Authenticator::new(users.clone(), config.clone()));

        let state = AppState::new(auth.clone(), Arc::new(UserManager::new(users)), config);

        Self {
            repo,
            auth,
            router: create_router(state),
        }
    }

    /// Insert a user directly; the stored hash cannot be signed in with.
    pub fn seed(&self, id: i32, name: &str, role: UserRole) -> User {
        let user = User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "$argon2id$seeded".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.repo.insert(user.clone());
        user
    }

    /// `Cookie` header value carrying a freshly issued token for `user`
    pub fn cookie_for(&self, user: &User) -> String {
        let token = self.auth.issue_token(user).unwrap();
        format!("token={}", token.access_token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
