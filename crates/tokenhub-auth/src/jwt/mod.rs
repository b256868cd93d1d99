//! Access token issuance and verification.

pub mod claims;
pub mod error;
pub mod issuer;
pub mod verifier;

pub use claims::AccessClaims;
pub use error::TokenError;
pub use issuer::{AccessTokenIssuer, IssuedAccessToken};
pub use verifier::AccessTokenVerifier;
