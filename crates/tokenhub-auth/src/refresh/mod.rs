//! Opaque refresh tokens: minting, persistence and rotate-on-use.

pub mod manager;
pub mod secret;

pub use manager::{IssuedRefreshToken, RefreshTokenManager, RotatedRefreshToken};
pub use secret::{MintedSecret, digest, mint};
