//! Custom axum extractors that turn bad input into validation errors.

mod user_id;
mod validated_json;

pub use user_id::{parse_user_id, UserId};
pub use validated_json::ValidatedJson;
