//! CLI command definitions and dispatch.

pub mod migrate;
pub mod session;
pub mod tokens;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use tokenhub_auth::SessionOrchestrator;
use tokenhub_core::config::AppConfig;
use tokenhub_core::error::AppError;
use tokenhub_database::{DatabasePool, RefreshTokenRepository, UserRepository};

/// TokenHub: credential issuance and session lifecycle
#[derive(Debug, Parser)]
#[command(name = "tokenhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "TOKENHUB_CONFIG", default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User account management
    User(user::UserArgs),
    /// Session flows: login, refresh, logout, me
    Session(session::SessionArgs),
    /// Refresh token maintenance
    Tokens(tokens::TokensArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::User(args) => user::execute(args, config, self.format).await,
            Commands::Session(args) => session::execute(args, config, self.format).await,
            Commands::Tokens(args) => tokens::execute(args, config, self.format).await,
        }
    }
}

/// Helper: connect to the configured database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: build the session orchestrator over PostgreSQL repositories
pub fn orchestrator(
    config: &AppConfig,
    db: &DatabasePool,
) -> Result<SessionOrchestrator, AppError> {
    SessionOrchestrator::new(
        config,
        Arc::new(UserRepository::new(db.pool().clone())),
        Arc::new(RefreshTokenRepository::new(db.pool().clone())),
    )
}

/// Helper: use the given password or prompt for one without echo
pub fn password_or_prompt(
    password: &Option<String>,
    prompt: &str,
    confirm: bool,
) -> Result<String, AppError> {
    if let Some(p) = password {
        return Ok(p.clone());
    }

    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}
