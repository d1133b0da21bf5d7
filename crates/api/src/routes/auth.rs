//! Registration, login and the current-user endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use artisania_core::{Address, UserRole};

use super::address::AddressInput;
use super::extract::{ValidatedJson, clean, validate_phone};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// POST /api/auth/register body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "First name is required and must be less than 50 characters"
    ))]
    pub first_name: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Last name is required and must be less than 50 characters"
    ))]
    pub last_name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub role: Option<UserRole>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(nested)]
    pub address: Option<AddressInput>,
}

/// POST /api/auth/login body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register an account and sign it in.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let registration = Registration {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password: req.password,
        role: req.role.unwrap_or_default(),
        phone: clean(req.phone),
        address: req.address.map(Address::from),
    };

    let user = AuthService::new(state.pool()).register(registration).await?;
    let token = state.tokens().issue(user.id, user.role)?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": user,
        })),
    ))
}

/// Exchange email and password for a bearer token.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.pool())
        .login(&req.email, &req.password)
        .await?;
    let token = state.tokens().issue(user.id, user.role)?;

    add_breadcrumb("auth", "Login", None);
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": user,
    })))
}

/// The account behind the bearer token.
///
/// GET /api/auth/me
pub async fn me(RequireAuth(user): RequireAuth) -> Json<Value> {
    Json(json!({ "user": user }))
}

/// Tokens are stateless, so logging out is the client discarding its token.
///
/// POST /api/auth/logout
pub async fn logout(RequireAuth(user): RequireAuth) -> Json<Value> {
    tracing::info!(user_id = %user.id, "User logged out");
    Json(json!({ "message": "Logout successful" }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Youssef","lastName":"Benali","email":"not-an-email","password":"123"}"#,
        )
        .unwrap();
        let errs = req.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("first_name"));
    }

    #[test]
    fn test_register_request_missing_fields_are_reported() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        let errs = req.validate().unwrap_err();
        let fields = errs.field_errors();
        for field in ["first_name", "last_name", "email", "password"] {
            assert!(fields.contains_key(field), "{field} should be reported");
        }
    }

    #[test]
    fn test_register_request_role_and_address() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Khadija","lastName":"Idrissi","email":"k@atlas.ma",
                "password":"zellige9","role":"seller","phone":"+212 600 000 000",
                "address":{"city":"Tetouan"}}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.role, Some(UserRole::Seller));
        let address = Address::from(req.address.unwrap());
        assert_eq!(address.city.as_deref(), Some("Tetouan"));
        assert_eq!(address.country, "Morocco");
    }

    #[test]
    fn test_login_request_validation() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":"a@b.ma"}"#).unwrap();
        let errs = req.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("password"));
    }
}
