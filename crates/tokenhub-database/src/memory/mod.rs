//! In-memory store implementations.
//!
//! Used by tests and by single-process tooling. Each store guards its map
//! with one lock, which makes every trait method atomic with respect to
//! the others.

pub mod refresh_token;
pub mod user;

pub use refresh_token::MemoryRefreshTokenStore;
pub use user::MemoryCredentialStore;
