//! # tokenhub-auth
//!
//! Credential issuance and session lifecycle for TokenHub.
//!
//! ## Modules
//!
//! - `jwt`: HS256 access token issuance and verification
//! - `password`: Argon2id password hashing and policy enforcement
//! - `refresh`: Opaque refresh tokens with single-use rotation
//! - `session`: Register, login, refresh, logout and `me` flows

pub mod jwt;
pub mod password;
pub mod refresh;
pub mod session;

pub use jwt::{AccessClaims, AccessTokenIssuer, AccessTokenVerifier, IssuedAccessToken, TokenError};
pub use password::{PasswordHasher, PasswordValidator};
pub use refresh::{IssuedRefreshToken, RefreshTokenManager, RotatedRefreshToken};
pub use session::{
    ChangePasswordRequest, LoginRequest, LogoutOutcome, RefreshCookie, RegisterRequest,
    SessionOrchestrator, SessionTokens,
};
