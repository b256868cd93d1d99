//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tokenhub_auth::{ChangePasswordRequest, RegisterRequest};
use tokenhub_core::config::AppConfig;
use tokenhub_core::error::AppError;
use tokenhub_database::{CredentialStore, UserRepository};
use tokenhub_entity::user::{User, UserProfile};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a new account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Login email
        #[arg(short, long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show an account
    Show {
        /// Login email
        email: String,
    },
    /// Change an account's password and revoke its sessions
    ChangePassword {
        /// Login email
        email: String,
    },
    /// Revoke every active session of an account
    RevokeSessions {
        /// Login email
        email: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct UserRow {
    /// User ID
    id: String,
    /// Name
    name: String,
    /// Email
    email: String,
    /// Created at
    created_at: String,
}

impl From<&UserProfile> for UserRow {
    fn from(p: &UserProfile) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            email: p.email.clone(),
            created_at: p.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let sessions = super::orchestrator(config, &db)?;
    let user_repo = UserRepository::new(db.pool().clone());

    match &args.command {
        UserCommand::Register {
            name,
            email,
            password,
        } => {
            let password = super::password_or_prompt(password, "Password", true)?;
            let profile = sessions
                .register(RegisterRequest {
                    name: name.clone(),
                    email: email.clone(),
                    password,
                })
                .await?;

            match format {
                OutputFormat::Table => {
                    output::print_success(&format!("User '{}' registered", profile.email));
                    output::print_list(&[UserRow::from(&profile)], format);
                }
                OutputFormat::Json => output::print_json(&profile),
            }
        }
        UserCommand::Show { email } => {
            let user = find_user(&user_repo, email).await?;
            let active = sessions
                .refresh_tokens()
                .count_active_for_user(user.id)
                .await?;

            match format {
                OutputFormat::Table => {
                    output::print_list(&[UserRow::from(&user.profile())], format);
                    output::print_kv("Active sessions", &active.to_string());
                }
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "user": user.profile(),
                    "active_sessions": active,
                })),
            }
        }
        UserCommand::ChangePassword { email } => {
            let user = find_user(&user_repo, email).await?;
            let current_password = super::password_or_prompt(&None, "Current password", false)?;
            let new_password = super::password_or_prompt(&None, "New password", true)?;

            let revoked = sessions
                .change_password(
                    user.id,
                    ChangePasswordRequest {
                        current_password,
                        new_password,
                    },
                )
                .await?;

            output::print_success(&format!(
                "Password changed for '{}'; {} session(s) revoked",
                email, revoked
            ));
        }
        UserCommand::RevokeSessions { email } => {
            let user = find_user(&user_repo, email).await?;
            let revoked = sessions.revoke_all_sessions(user.id).await?;
            output::print_success(&format!(
                "Revoked {} session(s) for '{}'",
                revoked, email
            ));
        }
    }

    db.close().await;
    Ok(())
}

async fn find_user(repo: &UserRepository, email: &str) -> Result<User, AppError> {
    repo.find_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{}' not found", email)))
}
