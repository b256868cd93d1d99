//! PostgreSQL repository implementations of the store traits.

pub mod refresh_token;
pub mod user;

pub use refresh_token::RefreshTokenRepository;
pub use user::UserRepository;
