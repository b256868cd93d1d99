//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use tokenhub_core::config::AppConfig;
use tokenhub_core::error::AppError;
use tokenhub_database::connection::SchemaStatus;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check database connectivity and schema
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            tokenhub_database::migration::run_migrations(db.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            match db.health_check().await? {
                SchemaStatus::Ready => output::print_success("Database is reachable and migrated."),
                SchemaStatus::MigrationsPending => output::print_warning(
                    "Database is reachable but migrations are pending. Run `tokenhub migrate run`.",
                ),
            }
        }
    }

    db.close().await;
    Ok(())
}
