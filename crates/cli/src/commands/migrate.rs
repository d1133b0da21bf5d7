//! Database migration commands.
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time.

use sqlx::migrate::Migrator;

use super::{CommandError, connect};

static MIGRATOR: Migrator = sqlx::migrate!("../api/migrations");

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!(available = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Print which migrations have been applied.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn status() -> Result<(), CommandError> {
    let pool = connect().await?;

    let applied: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
            .fetch_all(&pool)
            .await
            .unwrap_or_default();

    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!("  {} {} [{state}]", migration.version, migration.description);
    }
    Ok(())
}
