//! Admin authentication configuration

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Settings for password checks, lockout and sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Failed attempts allowed inside one window before lockout
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Length of the attempt window / lockout (seconds)
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_secs: u64,

    /// PBKDF2 iteration count
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Derived key length in bytes
    #[serde(default = "default_hash_length")]
    pub hash_length: usize,

    /// Random salt length in bytes
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,

    /// Admin session lifetime (seconds)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Maximum number of live admin sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,

    /// Plain-text password seeded when the store holds no credential.
    /// It is replaced by a salted hash on the first successful login.
    #[serde(default)]
    pub initial_password: Option<String>,
}

impl AuthConfig {
    pub fn lockout_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.lockout_duration_secs as i64)
    }

    pub fn session_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_ttl_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(AppError::Configuration(
                "auth.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.lockout_duration_secs == 0 {
            return Err(AppError::Configuration(
                "auth.lockout_duration_secs must be greater than 0".to_string(),
            ));
        }

        if self.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
            return Err(AppError::Configuration(format!(
                "auth.pbkdf2_iterations must be at least {}",
                MIN_PBKDF2_ITERATIONS
            )));
        }

        if self.hash_length < MIN_HASH_LENGTH {
            return Err(AppError::Configuration(format!(
                "auth.hash_length must be at least {} bytes",
                MIN_HASH_LENGTH
            )));
        }

        if self.salt_length < MIN_SALT_LENGTH {
            return Err(AppError::Configuration(format!(
                "auth.salt_length must be at least {} bytes",
                MIN_SALT_LENGTH
            )));
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            lockout_duration_secs: default_lockout_duration(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            hash_length: default_hash_length(),
            salt_length: default_salt_length(),
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
            initial_password: None,
        }
    }
}

const MIN_PBKDF2_ITERATIONS: u32 = 10_000;
const MIN_HASH_LENGTH: usize = 64;
const MIN_SALT_LENGTH: usize = 16;

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout_duration() -> u64 {
    900 // 15 minutes
}

fn default_pbkdf2_iterations() -> u32 {
    MIN_PBKDF2_ITERATIONS
}

fn default_hash_length() -> usize {
    MIN_HASH_LENGTH
}

fn default_salt_length() -> usize {
    MIN_SALT_LENGTH
}

fn default_session_ttl() -> u64 {
    43_200 // 12 hours
}

fn default_max_sessions() -> u64 {
    1_000
}
