//! Success envelopes shared by the handlers.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{User, UserResponse};

/// `{ message }`
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// `{ message, user }`
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    #[schema(example = "Successfully retrieved user")]
    pub message: String,
    pub user: UserResponse,
}

impl UserEnvelope {
    pub fn new(message: &str, user: User) -> Self {
        Self {
            message: message.to_string(),
            user: UserResponse::from(user),
        }
    }
}

/// `{ message, users, count }`
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    #[schema(example = "Successfully retrieved users")]
    pub message: String,
    pub users: Vec<UserResponse>,
    pub count: usize,
}
