//! Refresh token maintenance commands.

use chrono::Duration;
use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use tokenhub_core::config::{AppConfig, MAX_PURGE_RETENTION_DAYS};
use tokenhub_core::error::AppError;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokensCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokensCommand {
    /// Delete refresh tokens that expired or were revoked long ago
    Purge {
        /// Retention in days (defaults to session.purge_retention_days)
        #[arg(long, value_parser = clap::value_parser!(u64).range(0..=MAX_PURGE_RETENTION_DAYS))]
        retention_days: Option<u64>,
    },
}

/// Execute token commands
pub async fn execute(
    args: &TokensArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let sessions = super::orchestrator(config, &db)?;

    match &args.command {
        TokensCommand::Purge { retention_days } => {
            let retention = retention_days.map(retention_from_days).transpose()?;
            let purged = sessions.purge_expired(retention).await?;
            match format {
                OutputFormat::Table => {
                    output::print_success(&format!("Purged {} refresh token(s)", purged))
                }
                OutputFormat::Json => output::print_json(&serde_json::json!({ "purged": purged })),
            }
        }
    }

    db.close().await;
    Ok(())
}

fn retention_from_days(days: u64) -> Result<Duration, AppError> {
    i64::try_from(days)
        .ok()
        .filter(|d| (0..=MAX_PURGE_RETENTION_DAYS as i64).contains(d))
        .and_then(Duration::try_days)
        .ok_or_else(|| {
            AppError::validation(format!(
                "--retention-days must be between 0 and {MAX_PURGE_RETENTION_DAYS}"
            ))
        })
}
