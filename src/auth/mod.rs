//! Admin authentication
//!
//! A single admin credential guards every catalog write. This module holds
//! the pieces of the login flow:
//!
//! - [`PasswordHasher`]: PBKDF2-HMAC-SHA512 hashing and plain-text migration
//! - [`RateLimiter`]: per-client sliding-window lockout
//! - [`AuthGuard`]: the two combined into one `authenticate` call
//! - [`SessionStore`]: bearer tokens handed out after a successful login

mod config;
mod credential;
mod guard;
mod rate_limiter;
mod session;

pub use config::AuthConfig;
pub use credential::{Credential, PasswordHasher, Verification};
pub use guard::AuthGuard;
pub use rate_limiter::{AttemptWindow, RateLimitStatus, RateLimiter};
pub use session::{Session, SessionStore};

use crate::error::AppError;
use thiserror::Error;

/// Login failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Too many failed attempts, retry in {retry_after_minutes} minute(s)")]
    RateLimited { retry_after_minutes: u64 },

    #[error("Invalid password")]
    InvalidPassword,

    #[error("No admin credential configured")]
    NotConfigured,
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::RateLimited {
                retry_after_minutes,
            } => AppError::RateLimit {
                retry_after_minutes,
            },
            AuthError::InvalidPassword | AuthError::NotConfigured => {
                AppError::Authentication(err.to_string())
            }
        }
    }
}
