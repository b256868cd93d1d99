//! Unified application error types for TokenHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.
//!
//! Authentication failures are built through fixed constructors
//! ([`AppError::invalid_credentials`], [`AppError::invalid_refresh_token`],
//! [`AppError::unauthorized`]) so the outward message never depends on the
//! underlying cause.

use std::fmt;
use thiserror::Error;

/// Outward message for every failed password login.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Outward message for every rejected refresh token.
pub const INVALID_REFRESH_TOKEN_MESSAGE: &str = "Invalid refresh token";

/// Outward message for every rejected access token or vanished identity.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A configuration error occurred (fatal at startup).
    Configuration,
    /// Input validation failed.
    Validation,
    /// Password login failed (unknown email or wrong password).
    InvalidCredentials,
    /// A presented refresh token is unknown, expired, or revoked.
    InvalidRefreshToken,
    /// The access token is invalid or its subject no longer exists.
    Unauthorized,
    /// A conflict occurred (duplicate email).
    Conflict,
    /// The requested resource was not found.
    NotFound,
    /// A store error occurred.
    Database,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// HTTP status code a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::InvalidCredentials | Self::InvalidRefreshToken | Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Configuration | Self::Database | Self::Serialization | Self::Internal => 500,
        }
    }

    /// Whether this kind describes a failure the caller caused and can fix.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::InvalidRefreshToken => write!(f, "INVALID_REFRESH_TOKEN"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Database => write!(f, "DATABASE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout TokenHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// The single error returned for any failed password login.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, INVALID_CREDENTIALS_MESSAGE)
    }

    /// The single error returned for any rejected refresh token.
    pub fn invalid_refresh_token() -> Self {
        Self::new(ErrorKind::InvalidRefreshToken, INVALID_REFRESH_TOKEN_MESSAGE)
    }

    /// The single error returned for any rejected access token.
    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized, UNAUTHORIZED_MESSAGE)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = err.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        Self::with_source(
            ErrorKind::Validation,
            format!("Invalid input: {}", fields.join(", ")),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_have_fixed_messages() {
        assert_eq!(
            AppError::invalid_credentials().to_string(),
            "INVALID_CREDENTIALS: Invalid email or password"
        );
        assert_eq!(
            AppError::invalid_refresh_token().to_string(),
            "INVALID_REFRESH_TOKEN: Invalid refresh token"
        );
        assert_eq!(AppError::unauthorized().to_string(), "UNAUTHORIZED: Unauthorized");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::Validation.status_code(), 400);
        assert_eq!(ErrorKind::InvalidRefreshToken.status_code(), 401);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::Database.status_code(), 500);
        assert!(!ErrorKind::Configuration.is_client_error());
        assert!(ErrorKind::Unauthorized.is_client_error());
    }

    #[test]
    fn test_clone_drops_source() {
        let err = AppError::with_source(
            ErrorKind::Internal,
            "boom",
            std::io::Error::other("disk"),
        );
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Internal);
        assert!(cloned.source.is_none());
    }
}
