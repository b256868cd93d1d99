//! # tokenhub-database
//!
//! PostgreSQL connection management, the store traits the session engine
//! is written against, and two implementations of them: PostgreSQL
//! repositories for production and in-memory stores for tests and
//! single-process tooling.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::{DatabasePool, SchemaStatus};
pub use memory::{MemoryCredentialStore, MemoryRefreshTokenStore};
pub use repositories::{RefreshTokenRepository, UserRepository};
pub use store::{CredentialStore, RefreshTokenStore};
