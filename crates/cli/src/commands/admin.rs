//! Admin account management.
//!
//! Self-registration never grants the admin role, so the first admin (and
//! every later one) is created here.
//!
//! # Usage
//!
//! ```bash
//! artisania-cli admin create -e admin@example.com -f Amina -l Alaoui
//! ```
//!
//! The password is read from `ARTISANIA_ADMIN_PASSWORD` when `--password` is
//! omitted, so it stays out of shell history.

use artisania_api::db::RepositoryError;
use artisania_api::db::users::{NewUser, UserRepository};
use artisania_api::services::auth::{hash_password, validate_new_password};
use artisania_core::{Email, UserId, UserRole};

use super::{CommandError, connect};

/// Create an active admin account.
///
/// # Errors
///
/// Returns an error if the email is invalid, the password is weak, or an
/// account with that email already exists.
pub async fn create_user(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: Option<String>,
) -> Result<UserId, CommandError> {
    let email = Email::parse(email).map_err(|_| CommandError::InvalidEmail(email.to_owned()))?;

    let password = match password {
        Some(p) => p,
        None => std::env::var("ARTISANIA_ADMIN_PASSWORD")
            .map_err(|_| CommandError::MissingEnvVar("ARTISANIA_ADMIN_PASSWORD"))?,
    };
    validate_new_password(&password)?;
    let password_hash = hash_password(&password)?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    tracing::info!("Creating admin user: {email}");

    let new_user = NewUser {
        first_name: first_name.trim().to_owned(),
        last_name: last_name.trim().to_owned(),
        email: email.clone(),
        role: UserRole::Admin,
        phone: None,
        address: None,
    };

    let user = users
        .create_with_password(&new_user, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CommandError::UserExists(email.to_string()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
