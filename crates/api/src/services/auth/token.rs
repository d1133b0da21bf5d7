//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and role. They are stateless:
//! logging out is a client-side operation and a token stays valid until its
//! `exp`.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use artisania_core::{UserId, UserRole};

use super::AuthError;
use crate::config::JwtConfig;

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub role: UserRole,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The user this token was issued to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenInvalid` if `sub` is not a user id.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| AuthError::TokenInvalid("subject is not a user id".to_string()))
    }
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            ttl_secs: i64::try_from(config.ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `user` with the given `role`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, user: UserId, role: UserRole) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.to_string(),
            role,
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    /// Verify a token's signature, issuer, and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for expired tokens and
    /// `AuthError::TokenInvalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn service(secret: &str, issuer: &str) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: SecretString::from(secret.to_string()),
            ttl: Duration::from_secs(3600),
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service("q8Zt3vL0pN5xR2mW7yK4bH9cJ6dF1gS0", "artisania");
        let token = tokens.issue(UserId::new(42), UserRole::Seller).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert_eq!(claims.role, UserRole::Seller);
        assert_eq!(claims.iss, "artisania");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = service("q8Zt3vL0pN5xR2mW7yK4bH9cJ6dF1gS0", "artisania");
        let other = service("Hk2mP9qL4vX7nR1tW8yB3cF6jD0sG5zA", "artisania");
        let token = issuer.issue(UserId::new(1), UserRole::Customer).unwrap();

        assert!(matches!(
            other.verify(&token),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let issuer = service("q8Zt3vL0pN5xR2mW7yK4bH9cJ6dF1gS0", "someone-else");
        let verifier = service("q8Zt3vL0pN5xR2mW7yK4bH9cJ6dF1gS0", "artisania");
        let token = issuer.issue(UserId::new(1), UserRole::Customer).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let tokens = service("q8Zt3vL0pN5xR2mW7yK4bH9cJ6dF1gS0", "artisania");
        let now = Utc::now().timestamp();
        let token = tokens
            .sign(&Claims {
                sub: "1".to_string(),
                role: UserRole::Customer,
                iss: "artisania".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let tokens = service("q8Zt3vL0pN5xR2mW7yK4bH9cJ6dF1gS0", "artisania");
        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "abc".to_string(),
            role: UserRole::Customer,
            iss: "artisania".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(claims.user_id().is_err());
    }
}
