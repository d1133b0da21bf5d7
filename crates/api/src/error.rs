//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"message": "..."}` JSON; validation failures add an `errors` array of
//! `{field, message}` pairs. Server-side failures are captured to Sentry and
//! logged, and the client only ever sees a generic message for them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::db::RepositoryError;
use crate::db::orders::OrderWriteError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;
use crate::services::products::ProductError;
use crate::services::shops::ShopError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Shop error: {0}")]
    Shop(#[from] ShopError),

    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Request body or query failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One failed field in a validation error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl AppError {
    /// HTTP status and client-facing message.
    fn status_and_message(&self) -> (StatusCode, String) {
        const INTERNAL: &str = "Internal server error";

        match self {
            Self::Database(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }
            Self::Database(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
            Self::Auth(err) => auth_status(err),
            Self::Order(err) => order_status(err),
            Self::Shop(err) => match err {
                ShopError::NotFound => (StatusCode::NOT_FOUND, "Shop not found".to_string()),
                ShopError::NotSeller => (
                    StatusCode::FORBIDDEN,
                    "Only sellers can create shops".to_string(),
                ),
                ShopError::AlreadyHasShop => {
                    (StatusCode::BAD_REQUEST, "You already have a shop".to_string())
                }
                ShopError::NoShop => (
                    StatusCode::NOT_FOUND,
                    "You don't have a shop yet".to_string(),
                ),
                ShopError::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
                ShopError::Repository(RepositoryError::NotFound) => {
                    (StatusCode::NOT_FOUND, "Shop not found".to_string())
                }
                ShopError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
                }
            },
            Self::Product(err) => match err {
                ProductError::NotFound | ProductError::Repository(RepositoryError::NotFound) => {
                    (StatusCode::NOT_FOUND, "Product not found".to_string())
                }
                ProductError::NoShop => (
                    StatusCode::BAD_REQUEST,
                    "You must create a shop first before adding products".to_string(),
                ),
                ProductError::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
                ProductError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
                }
            },
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later".to_string(),
            ),
        }
    }
}

fn auth_status(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials | AuthError::InvalidEmail(_) => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ),
        AuthError::AccountDeactivated => {
            (StatusCode::UNAUTHORIZED, "Account is deactivated".to_string())
        }
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
        AuthError::UserAlreadyExists => (
            StatusCode::BAD_REQUEST,
            "User already exists with this email".to_string(),
        ),
        AuthError::RoleNotAllowed(_) => (StatusCode::BAD_REQUEST, "Invalid role".to_string()),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, capitalize(msg)),
        AuthError::IncorrectPassword => (
            StatusCode::BAD_REQUEST,
            "Current password is incorrect".to_string(),
        ),
        AuthError::TokenInvalid(_) => (StatusCode::UNAUTHORIZED, "Invalid token.".to_string()),
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired.".to_string()),
        AuthError::TokenSigning(_) | AuthError::Repository(_) | AuthError::PasswordHash => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

fn order_status(err: &OrderError) -> (StatusCode, String) {
    match err {
        OrderError::NotFound | OrderError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Order not found".to_string())
        }
        OrderError::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
        OrderError::NoShop(msg) => (StatusCode::BAD_REQUEST, (*msg).to_string()),
        OrderError::NotCancellable => (
            StatusCode::BAD_REQUEST,
            "Order cannot be cancelled at this stage".to_string(),
        ),
        OrderError::Write(write) => match write {
            OrderWriteError::ProductUnavailable(id) => (
                StatusCode::BAD_REQUEST,
                format!("Product {id} not found or inactive"),
            ),
            OrderWriteError::InsufficientStock { name, .. } => (
                StatusCode::BAD_REQUEST,
                format!("Insufficient stock for product {name}"),
            ),
            OrderWriteError::MixedShops => (
                StatusCode::BAD_REQUEST,
                "All products in an order must come from the same shop".to_string(),
            ),
            OrderWriteError::Transition(t) => (
                StatusCode::BAD_REQUEST,
                format!("Cannot change order status from {} to {}", t.from, t.to),
            ),
            OrderWriteError::Pricing(e) => (StatusCode::BAD_REQUEST, capitalize(&e.to_string())),
            OrderWriteError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Order not found".to_string())
            }
            OrderWriteError::Repository(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        },
        OrderError::NumberExhausted | OrderError::Repository(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Flatten nested validator errors into `{field, message}` pairs, sorted by
/// field. Field names are reported in the camelCase clients send, nested
/// structs use dotted paths (`address.postalCode`) and lists use indices
/// (`items[0].quantity`).
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_field_errors("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let field = camel_case(field);
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map_or_else(|| format!("Invalid {path}"), ToString::to_string),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let errors = match &self {
            Self::Validation(errs) => Some(field_errors(errs)),
            _ => None,
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("order", "Status changed", Some(&[("order_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisania_core::{OrderStatus, ProductId, TransitionError};
    use axum::body::to_bytes;
    use validator::Validate;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) =
            body_json(AppError::Internal("connection refused on 10.0.0.3".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_order_errors_map_to_client_messages() {
        let (status, body) = body_json(AppError::Order(OrderError::Write(
            OrderWriteError::InsufficientStock {
                product_id: ProductId::new(3),
                name: "Tagine pot".to_string(),
                available: 1,
                requested: 2,
            },
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Insufficient stock for product Tagine pot");

        let (status, body) = body_json(AppError::Order(OrderError::Write(
            OrderWriteError::Transition(TransitionError {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            }),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Cannot change order status from delivered to pending"
        );

        let (status, _) = body_json(AppError::Order(OrderError::Forbidden("no"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let (status, body) = body_json(AppError::Auth(AuthError::AccountDeactivated)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Account is deactivated");

        let (status, body) = body_json(AppError::Auth(AuthError::TokenExpired)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token expired.");

        let (status, _) = body_json(AppError::Auth(AuthError::UserAlreadyExists)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "City is required"))]
        city: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(nested)]
        address: Inner,
    }

    #[tokio::test]
    async fn test_validation_errors_are_flattened() {
        let errs = Outer {
            name: String::new(),
            address: Inner {
                city: String::new(),
            },
        }
        .validate()
        .unwrap_err();

        let fields = field_errors(&errs);
        assert_eq!(
            fields,
            vec![
                FieldError {
                    field: "address.city".to_string(),
                    message: "City is required".to_string(),
                },
                FieldError {
                    field: "name".to_string(),
                    message: "Name is required".to_string(),
                },
            ]
        );

        let (status, body) = body_json(AppError::Validation(errs)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_camel_case_field_names() {
        assert_eq!(camel_case("postal_code"), "postalCode");
        assert_eq!(camel_case("customer_notes"), "customerNotes");
        assert_eq!(camel_case("email"), "email");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("quantity must be at least 1"), "Quantity must be at least 1");
        assert_eq!(capitalize(""), "");
    }
}
