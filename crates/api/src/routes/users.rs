//! User profile and account administration endpoints.

use std::borrow::Cow;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::{Validate, ValidationError};

use artisania_core::{Address, UserId, UserRole};

use super::address::AddressInput;
use super::extract::{QueryParams, ValidatedJson, clean, parse_id, validate_phone};
use crate::db::RepositoryError;
use crate::db::shops::ShopRepository;
use crate::db::users::{UserRepository, UserUpdate};
use crate::error::{AppError, Result, capitalize};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{PageParams, User};
use crate::services::Actor;
use crate::services::auth::{AuthError, AuthService, validate_new_password};
use crate::services::orders::OrderService;
use crate::state::AppState;

const ACCESS_DENIED: &str = "Access denied";
const OWN_STATUS: &str = "You cannot change the status of your own account";

/// PUT /api/users/{id} body. `role`, `isActive` and `isVerified` are
/// admin-only.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
    #[validate(nested)]
    pub address: Option<AddressInput>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UpdateUserRequest {
    const fn touches_admin_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some() || self.is_verified.is_some()
    }

    /// Only admins may set role or status, and never on their own account.
    fn check_admin_fields(&self, actor: Actor, target: UserId) -> Result<()> {
        if !self.touches_admin_fields() {
            return Ok(());
        }
        if !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can change role or account status".to_string(),
            ));
        }
        if actor.id == target {
            return Err(AppError::BadRequest(OWN_STATUS.to_string()));
        }
        Ok(())
    }
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            first_name: clean(req.first_name),
            last_name: clean(req.last_name),
            phone: clean(req.phone),
            avatar: clean(req.avatar),
            address: req.address.map(Address::from),
            role: req.role,
            is_active: req.is_active,
            is_verified: req.is_verified,
        }
    }
}

fn validate_password_strength(password: &str) -> std::result::Result<(), ValidationError> {
    validate_new_password(password).map_err(|e| {
        let message = match e {
            AuthError::WeakPassword(msg) => capitalize(&msg),
            other => capitalize(&other.to_string()),
        };
        ValidationError::new("password").with_message(Cow::Owned(message))
    })
}

/// PUT /api/users/{id}/password body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

fn user_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
        other => AppError::Database(other),
    }
}

async fn load_user(state: &AppState, id: UserId) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

fn ensure_self_or_admin(caller: &User, id: UserId) -> Result<()> {
    if caller.id == id || caller.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(ACCESS_DENIED.to_string()))
    }
}

/// Every account, newest first.
///
/// GET /api/users
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Value>> {
    let page = UserRepository::new(state.pool()).list(params).await?;
    Ok(Json(json!({
        "users": page.items,
        "pagination": page.pagination,
    })))
}

/// A profile with the user's shop (if any) and purchase statistics.
///
/// GET /api/users/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: UserId = parse_id(&id, "User")?;
    ensure_self_or_admin(&caller, id)?;

    let user = load_user(&state, id).await?;
    let shop = if user.role.can_sell() {
        ShopRepository::new(state.pool()).get_by_owner(id).await?
    } else {
        None
    };
    let stats = OrderService::new(state.pool(), &state.config().pricing)
        .customer_stats(id)
        .await?;

    Ok(Json(json!({
        "user": user,
        "shop": shop,
        "stats": stats,
    })))
}

/// Purchase statistics plus, for sellers, the shop's counters.
///
/// GET /api/users/{id}/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: UserId = parse_id(&id, "User")?;
    ensure_self_or_admin(&caller, id)?;

    let user = load_user(&state, id).await?;
    let orders = OrderService::new(state.pool(), &state.config().pricing)
        .customer_stats(id)
        .await?;
    let shop = if user.role.can_sell() {
        ShopRepository::new(state.pool())
            .get_by_owner(id)
            .await?
            .map(|s| s.stats)
    } else {
        None
    };

    Ok(Json(json!({
        "stats": {
            "orders": orders,
            "shop": shop,
        }
    })))
}

/// Update a profile.
///
/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<Value>> {
    let id: UserId = parse_id(&id, "User")?;
    ensure_self_or_admin(&caller, id)?;
    let actor = Actor {
        id: caller.id,
        role: caller.role,
    };
    req.check_admin_fields(actor, id)?;

    let user = UserRepository::new(state.pool())
        .update(id, &UserUpdate::from(req))
        .await
        .map_err(user_not_found)?;

    tracing::info!(user_id = %id, actor = %caller.id, "User updated");

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": user,
    })))
}

/// Change one's own password.
///
/// PUT /api/users/{id}/password
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    let id: UserId = parse_id(&id, "User")?;
    if caller.id != id {
        return Err(AppError::Forbidden(
            "You can only change your own password".to_string(),
        ));
    }

    AuthService::new(state.pool())
        .change_password(id, &req.current_password, &req.new_password)
        .await?;

    tracing::info!(user_id = %id, "Password changed");
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Activate or deactivate an account.
///
/// PUT /api/users/{id}/toggle-status
pub async fn toggle_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: UserId = parse_id(&id, "User")?;
    if admin.id == id {
        return Err(AppError::BadRequest(OWN_STATUS.to_string()));
    }

    let user = UserRepository::new(state.pool())
        .toggle_active(id)
        .await
        .map_err(user_not_found)?;

    let message = if user.is_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };
    tracing::info!(user_id = %id, active = user.is_active, admin = %admin.id, "User status toggled");

    Ok(Json(json!({
        "message": message,
        "user": user,
    })))
}

/// Deactivate an account. Accounts are never removed so their orders stay
/// attributable.
///
/// DELETE /api/users/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: UserId = parse_id(&id, "User")?;
    ensure_self_or_admin(&caller, id)?;

    UserRepository::new(state.pool())
        .set_active(id, false)
        .await
        .map_err(user_not_found)?;

    tracing::info!(user_id = %id, actor = %caller.id, "User deactivated");
    Ok(Json(json!({ "message": "User account deactivated successfully" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_admin_fields() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"firstName":"Omar"}"#).unwrap();
        assert!(!req.touches_admin_fields());

        let req: UpdateUserRequest = serde_json::from_str(r#"{"isActive":false}"#).unwrap();
        assert!(req.touches_admin_fields());
    }

    #[test]
    fn test_admin_cannot_change_own_role_or_status() {
        let admin = Actor {
            id: UserId::new(1),
            role: UserRole::Admin,
        };
        let demote: UpdateUserRequest = serde_json::from_str(r#"{"role":"customer"}"#).unwrap();

        match demote.check_admin_fields(admin, UserId::new(1)) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, OWN_STATUS),
            other => panic!("expected 400, got {other:?}"),
        }
        assert!(demote.check_admin_fields(admin, UserId::new(2)).is_ok());

        let rename: UpdateUserRequest = serde_json::from_str(r#"{"firstName":"Amina"}"#).unwrap();
        assert!(rename.check_admin_fields(admin, UserId::new(1)).is_ok());
    }

    #[test]
    fn test_non_admin_cannot_set_admin_fields() {
        let seller = Actor {
            id: UserId::new(5),
            role: UserRole::Seller,
        };
        let promote: UpdateUserRequest = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert!(matches!(
            promote.check_admin_fields(seller, UserId::new(5)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_update_request_validation() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"firstName":"O","avatar":"not a url"}"#).unwrap();
        let errs = req.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("avatar"));
    }

    #[test]
    fn test_change_password_request_strength() {
        let weak: ChangePasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"old","newPassword":"alllower1"}"#)
                .unwrap();
        let errs = weak.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("new_password"));

        let strong: ChangePasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"old","newPassword":"Kasbah2024"}"#)
                .unwrap();
        assert!(strong.validate().is_ok());
    }

    #[test]
    fn test_blank_fields_are_dropped_from_update() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"firstName":"  Omar ","phone":"  "}"#).unwrap();
        let update = UserUpdate::from(req);
        assert_eq!(update.first_name.as_deref(), Some("Omar"));
        assert_eq!(update.phone, None);
    }
}
