//! Artisania CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! artisania-cli migrate run
//!
//! # List applied and pending migrations
//! artisania-cli migrate status
//!
//! # Create an admin account (password from ARTISANIA_ADMIN_PASSWORD)
//! artisania-cli admin create -e admin@example.com -f Amina -l Alaoui
//!
//! # Insert a demo seller, shop, and products
//! artisania-cli seed
//! ```
//!
//! # Environment Variables
//!
//! - `ARTISANIA_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ARTISANIA_ADMIN_PASSWORD` - Password for `admin create` when `--password` is omitted

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "artisania-cli")]
#[command(author, version, about = "Artisania CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with a demo seller, shop, and products
    Seed {
        /// Password for the demo seller account
        #[arg(long, env = "ARTISANIA_SEED_PASSWORD", default_value = "Artisan123")]
        password: String,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply pending migrations
    Run,
    /// Show applied and pending migrations
    Status,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Password (defaults to `ARTISANIA_ADMIN_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { action } => match action {
            MigrateAction::Run => commands::migrate::run().await?,
            MigrateAction::Status => commands::migrate::status().await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                first_name,
                last_name,
                password,
            } => {
                commands::admin::create_user(&email, &first_name, &last_name, password).await?;
            }
        },
        Commands::Seed { password } => commands::seed::demo(&password).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_parses() {
        let cli = Cli::try_parse_from([
            "artisania-cli",
            "admin",
            "create",
            "-e",
            "admin@example.com",
            "-f",
            "Amina",
            "-l",
            "Alaoui",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Create { password: None, .. }
            })
        ));
    }
}
