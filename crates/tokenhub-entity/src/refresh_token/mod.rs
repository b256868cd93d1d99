//! Refresh token domain entities.

pub mod expiry;
pub mod model;

pub use expiry::RefreshTtlPolicy;
pub use model::{CreateRefreshToken, RefreshToken, RotateRefreshToken, RotatedRecords};
