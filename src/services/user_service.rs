//! User service - list, fetch, update and delete use cases.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{normalize_email, DeletedUser, Password, UpdateUser, User, UserPatch};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
///
/// Authorization is decided by the caller; this layer only enforces
/// the field allow-list and hashing.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Get user by ID
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// Apply a partial update; NotFound when the id has no row
    async fn update_user(&self, id: i32, update: UpdateUser) -> AppResult<User>;

    /// Remove a user; NotFound when the id has no row
    async fn delete_user(&self, id: i32) -> AppResult<DeletedUser>;
}

/// Concrete UserService over a repository.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

/// Build the allow-listed patch, hashing a supplied password.
fn build_patch(update: UpdateUser) -> AppResult<UserPatch> {
    let password_hash = match update.password {
        Some(plain) => Some(Password::new(&plain)?.into_string()),
        None => None,
    };

    Ok(UserPatch {
        name: update.name.map(|n| n.trim().to_string()),
        email: update.email.as_deref().map(normalize_email),
        role: update.role,
        password_hash,
    })
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_user(&self, id: i32, update: UpdateUser) -> AppResult<User> {
        let patch = build_patch(update)?;
        self.users.update(id, patch).await?.ok_or_not_found()
    }

    async fn delete_user(&self, id: i32) -> AppResult<DeletedUser> {
        self.users.delete(id).await?.ok_or_not_found()
    }
}
