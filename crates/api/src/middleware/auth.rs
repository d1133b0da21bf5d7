//! Bearer-token authentication extractors.
//!
//! Handlers opt into authentication by taking one of these extractors:
//!
//! - [`RequireAuth`]: any active account
//! - [`RequireSeller`]: sellers and admins
//! - [`RequireAdmin`]: admins only
//!
//! The token is verified, then the account is re-read so deactivated users
//! and role changes take effect immediately.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn me(RequireAuth(user): RequireAuth) -> Json<User> {
//!     Json(user)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::users::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::Actor;
use crate::state::AppState;

const NO_TOKEN: &str = "Access denied. No token provided.";
const INACTIVE: &str = "Token is not valid or user is inactive.";
const INSUFFICIENT: &str = "Access denied. Insufficient permissions.";

/// Extractor that requires a valid bearer token for an active account.
pub struct RequireAuth(pub User);

impl RequireAuth {
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            id: self.0.id,
            role: self.0.role,
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))?;

        let claims = state.tokens().verify(token)?;
        let user_id = claims.user_id()?;

        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized(INACTIVE.to_string()))?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        tracing::Span::current().record("user_id", user.id.as_i32());

        Ok(Self(user))
    }
}

/// Extractor that requires a seller or admin account.
pub struct RequireSeller(pub User);

impl RequireSeller {
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            id: self.0.id,
            role: self.0.role,
        }
    }
}

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.role.can_sell() {
            return Err(AppError::Forbidden(INSUFFICIENT.to_string()));
        }
        Ok(Self(user))
    }
}

/// Extractor that requires an admin account.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden(INSUFFICIENT.to_string()));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&parts(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
