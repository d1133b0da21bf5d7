//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use artisania_api::db::RepositoryError;
use artisania_api::services::auth::AuthError;
use artisania_api::services::products::ProductError;
use artisania_api::services::shops::ShopError;

/// Errors shared by every subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("User already exists with email: {0}")]
    UserExists(String),
}

/// Connect using `ARTISANIA_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ARTISANIA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("ARTISANIA_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(artisania_api::db::create_pool(&database_url).await?)
}
