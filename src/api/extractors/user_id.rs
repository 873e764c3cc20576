//! Path id extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::errors::{AppError, AppResult};

const ID_FIELD: &str = "id";

/// A strictly positive user id taken from the `:id` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::invalid_field(ID_FIELD, e.body_text()))?;

        parse_user_id(&raw).map(UserId)
    }
}

/// Parse a raw id: trimmed, base-10, greater than zero.
pub fn parse_user_id(raw: &str) -> AppResult<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_field(ID_FIELD, "ID is required"));
    }

    let value: i64 = match trimmed.parse() {
        Ok(value) => value,
        // "1.5" is a number, just not a usable id
        Err(_) if trimmed.parse::<f64>().is_ok_and(f64::is_finite) => {
            return Err(AppError::invalid_field(
                ID_FIELD,
                "ID must be a positive integer",
            ))
        }
        Err(_) => {
            return Err(AppError::invalid_field(
                ID_FIELD,
                "ID must be a valid number",
            ))
        }
    };

    if value <= 0 {
        return Err(AppError::invalid_field(
            ID_FIELD,
            "ID must be a positive integer",
        ));
    }

    i32::try_from(value)
        .map_err(|_| AppError::invalid_field(ID_FIELD, "ID must be a valid number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(raw: &str) -> String {
        match parse_user_id(raw) {
            Err(AppError::Validation(details)) => {
                assert_eq!(details[0].field, "id");
                details[0].message.clone()
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_positive_integers() {
        assert_eq!(parse_user_id("42").unwrap(), 42);
        assert_eq!(parse_user_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(message(""), "ID is required");
        assert_eq!(message("   "), "ID is required");
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(message("abc"), "ID must be a valid number");
        assert_eq!(message("12abc"), "ID must be a valid number");
        assert_eq!(message("99999999999"), "ID must be a valid number");
    }

    #[test]
    fn test_rejects_zero_negative_and_fractional() {
        assert_eq!(message("0"), "ID must be a positive integer");
        assert_eq!(message("-5"), "ID must be a positive integer");
        assert_eq!(message("1.5"), "ID must be a positive integer");
    }
}
