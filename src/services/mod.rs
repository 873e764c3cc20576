//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and persistence. They depend on the
//! `UserRepository` abstraction so tests can swap the storage.

mod auth_service;
mod user_service;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use user_service::{UserManager, UserService};
