//! Session flow commands, for exercising a deployment from a terminal.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use tokenhub_auth::session::bearer_token;
use tokenhub_auth::{LoginRequest, SessionTokens};
use tokenhub_core::config::AppConfig;
use tokenhub_core::error::AppError;

use super::user::UserRow;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Log in with email and password
    Login {
        /// Login email
        #[arg(short, long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Issue a long-lived refresh token
        #[arg(long)]
        remember_me: bool,
    },
    /// Exchange a refresh token for new credentials
    Refresh {
        /// Refresh token
        token: String,
    },
    /// Revoke a refresh token
    Logout {
        /// Refresh token
        token: Option<String>,
    },
    /// Resolve an access token to its user
    Me {
        /// Access token, optionally prefixed with "Bearer "
        token: String,
    },
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let sessions = super::orchestrator(config, &db)?;

    match &args.command {
        SessionCommand::Login {
            email,
            password,
            remember_me,
        } => {
            let password = super::password_or_prompt(password, "Password", false)?;
            let tokens = sessions
                .login(LoginRequest {
                    email: email.clone(),
                    password,
                    remember_me: *remember_me,
                })
                .await?;
            print_tokens(&tokens, format);
        }
        SessionCommand::Refresh { token } => {
            let tokens = sessions.refresh(token).await?;
            print_tokens(&tokens, format);
        }
        SessionCommand::Logout { token } => {
            let outcome = sessions.logout(token.as_deref()).await;
            match format {
                OutputFormat::Table => {
                    if outcome.revoked {
                        output::print_success("Refresh token revoked");
                    } else {
                        output::print_warning("No active refresh token matched");
                    }
                    output::print_kv("Set-Cookie", &outcome.cookie.to_header_value());
                }
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "revoked": outcome.revoked,
                    "set_cookie": outcome.cookie.to_header_value(),
                })),
            }
        }
        SessionCommand::Me { token } => {
            let token = bearer_token(token).unwrap_or(token);
            let profile = sessions.me(token).await?;
            match format {
                OutputFormat::Table => output::print_list(&[UserRow::from(&profile)], format),
                OutputFormat::Json => output::print_json(&profile),
            }
        }
    }

    db.close().await;
    Ok(())
}

fn print_tokens(tokens: &SessionTokens, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            output::print_kv("User", &tokens.user_id.to_string());
            output::print_kv("Access token", &tokens.access_token);
            output::print_kv("Access expires", &tokens.access_expires_at.to_rfc3339());
            output::print_kv("Refresh token", &tokens.refresh_token);
            output::print_kv("Refresh expires", &tokens.refresh_expires_at.to_rfc3339());
            output::print_kv("Set-Cookie", &tokens.cookie.to_header_value());
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "user_id": tokens.user_id,
            "access_token": tokens.access_token,
            "access_expires_at": tokens.access_expires_at,
            "refresh_token": tokens.refresh_token,
            "refresh_expires_at": tokens.refresh_expires_at,
            "set_cookie": tokens.cookie.to_header_value(),
        })),
    }
}
