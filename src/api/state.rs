//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, UserRepository, UserStore};
use crate::services::{AuthService, Authenticator, UserManager, UserService};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Runtime configuration (cookie flags, token lifetime)
    pub config: Config,
    /// Database handle for health checks; absent when storage is injected
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Wire the SeaORM store into both services.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(database.get_connection()));

        Self {
            auth_service: Arc::new(Authenticator::new(users.clone(), config.clone())),
            user_service: Arc::new(UserManager::new(users)),
            config,
            database: Some(database),
        }
    }

    /// Create application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        config: Config,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            config,
            database: None,
        }
    }
}
