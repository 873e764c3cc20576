//! HTTP request handlers.

pub mod auth_handler;
pub mod responses;
mod trim;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use user_handler::user_routes;
