//! Application configuration schemas.
//!
//! All configuration structs are deserialized from a TOML file via the
//! `config` crate, overlaid with `TOKENHUB__SECTION__KEY` environment
//! variables. Each sub-module represents a logical configuration section.
//! The merged configuration is resolved once at startup, validated, and
//! handed by reference to each component's constructor.

pub mod auth;
pub mod cookie;
pub mod database;
pub mod logging;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::cookie::{CookieConfig, SameSite};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::session::{MAX_PURGE_RETENTION_DAYS, MAX_REFRESH_TTL_DAYS, SessionConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Access token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Refresh token lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Refresh cookie attributes.
    #[serde(default)]
    pub cookie: CookieConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; environment variables prefixed with
    /// `TOKENHUB__` override any value it sets. The result is validated
    /// before it is returned.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TOKENHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), AppError> {
        self.database.validate()?;
        self.auth.validate()?;
        self.session.validate()?;
        Ok(())
    }
}
