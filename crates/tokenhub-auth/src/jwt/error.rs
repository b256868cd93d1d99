//! Access token verification failures.

use thiserror::Error;

use tokenhub_core::error::AppError;

/// Why an access token was rejected.
///
/// The variants exist for logging. Every one of them converts into the same
/// outward `Unauthorized` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The signature does not match the configured secret or algorithm.
    #[error("invalid token signature")]
    InvalidSignature,
    /// The `exp` claim is in the past.
    #[error("token has expired")]
    Expired,
    /// The `nbf` claim is in the future.
    #[error("token is not yet valid")]
    NotYetValid,
    /// The token cannot be decoded, or its issuer or audience is foreign.
    #[error("malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::Malformed,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::unauthorized()
    }
}
