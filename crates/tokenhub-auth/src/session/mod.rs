//! Session lifecycle: register, login, refresh, logout and identity lookup.

pub mod cookie;
pub mod orchestrator;
pub mod request;

pub use cookie::RefreshCookie;
pub use orchestrator::{LogoutOutcome, SessionOrchestrator, SessionTokens};
pub use request::{ChangePasswordRequest, LoginRequest, RegisterRequest, bearer_token};
