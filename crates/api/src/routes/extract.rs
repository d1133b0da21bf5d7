//! Request extractors shared by the route handlers.
//!
//! Axum's own `Json` and `Query` reject with plain-text bodies and, for JSON,
//! a 422. These wrappers turn every rejection into an [`AppError`] so clients
//! always get the same `{message, errors?}` shape and a 400.

use std::borrow::Cow;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use artisania_core::Phone;

use crate::error::AppError;

/// JSON body that has been deserialized and passed `validator` checks.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string parameters, with parse failures reported as 400 JSON.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Parse a path id. Anything that is not an integer id names a resource that
/// cannot exist, so it reads as not found.
///
/// # Errors
///
/// Returns `AppError::NotFound` with "`{what}` not found".
pub fn parse_id<I: From<i32>>(raw: &str, what: &str) -> Result<I, AppError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .map(I::from)
        .ok_or_else(|| AppError::NotFound(format!("{what} not found")))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// `validator` hook for phone number fields.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    Phone::parse(phone)
        .map(|_| ())
        .map_err(|_| invalid("phone", "Please provide a valid phone number"))
}

/// `validator` hook rejecting whitespace-only strings.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "This field is required"));
    }
    Ok(())
}

/// Trim and drop empty optional strings.
#[must_use]
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisania_core::{OrderId, UserId};

    use super::*;

    #[test]
    fn test_parse_id() {
        let id: UserId = parse_id("42", "User").unwrap();
        assert_eq!(id.as_i32(), 42);

        for raw in ["abc", "0", "-3", "64f1c2e9a7b3", "99999999999"] {
            match parse_id::<OrderId>(raw, "Order") {
                Err(AppError::NotFound(msg)) => assert_eq!(msg, "Order not found"),
                _ => panic!("{raw} should not parse"),
            }
        }
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+212 6 12 34 56 78").is_ok());
        let err = validate_phone("call me").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("Please provide a valid phone number")
        );
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Some("  Fes ".to_string())), Some("Fes".to_string()));
        assert_eq!(clean(Some("   ".to_string())), None);
        assert_eq!(clean(None), None);
    }
}
