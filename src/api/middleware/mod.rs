//! API middleware.

mod auth;

pub use auth::{
    auth_middleware, require_admin_for_role_change, require_identity, require_self_or_admin,
    CurrentUser,
};
