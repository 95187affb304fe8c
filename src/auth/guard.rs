//! Login flow: lockout check, password verification, failure accounting

use crate::auth::{
    AuthConfig, AuthError, AuthResult, Credential, PasswordHasher, RateLimiter, Verification,
};
use crate::metrics::{CREDENTIAL_MIGRATIONS_TOTAL, LOGIN_ATTEMPTS_TOTAL, RATE_LIMIT_LOCKOUTS_TOTAL};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Owns the hasher and the attempt tracker.
///
/// Built once at startup and shared behind an `Arc`; tests construct their
/// own instance so lockout state never leaks between them.
#[derive(Debug)]
pub struct AuthGuard {
    hasher: PasswordHasher,
    limiter: RateLimiter,
}

impl AuthGuard {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            hasher: PasswordHasher::new(config),
            limiter: RateLimiter::new(config.max_attempts, config.lockout_duration()),
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Full login check for `client_id`.
    ///
    /// The attempt is reserved against the lockout window before the
    /// password is checked and released again on success.
    ///
    /// Runs the key derivation, so async callers should move it onto a
    /// blocking thread.
    pub fn authenticate(
        &self,
        client_id: &str,
        password: &str,
        credential: &Credential,
    ) -> AuthResult<Verification> {
        self.authenticate_at(client_id, password, credential, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        client_id: &str,
        password: &str,
        credential: &Credential,
        now: DateTime<Utc>,
    ) -> AuthResult<Verification> {
        let window = self
            .limiter
            .try_begin_attempt_at(client_id, now)
            .map_err(|err| {
                LOGIN_ATTEMPTS_TOTAL.with_label_values(&["rate_limited"]).inc();
                warn!(client_id = %client_id, error = %err, "Login refused, client is locked out");
                err
            })?;

        let verification = self.hasher.verify(password, credential);

        if !verification.valid {
            LOGIN_ATTEMPTS_TOTAL.with_label_values(&["invalid_password"]).inc();
            if window.count == self.limiter.max_attempts() {
                RATE_LIMIT_LOCKOUTS_TOTAL.inc();
            }
            warn!(
                client_id = %client_id,
                attempts = window.count,
                max_attempts = self.limiter.max_attempts(),
                "Login failed"
            );
            return Err(AuthError::InvalidPassword);
        }

        self.limiter.clear(client_id);
        LOGIN_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();

        if verification.migrated.is_some() {
            CREDENTIAL_MIGRATIONS_TOTAL.inc();
            info!(client_id = %client_id, "Plain-text admin credential upgraded to salted hash");
        } else {
            info!(client_id = %client_id, "Admin login succeeded");
        }

        Ok(verification)
    }
}

impl Default for AuthGuard {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_lockout_after_repeated_failures() {
        let guard = AuthGuard::default();
        let credential = Credential::plain("letmein");
        let now = Utc::now();

        for _ in 0..5 {
            let result = guard.authenticate_at("1.2.3.4", "nope", &credential, now);
            assert!(matches!(result, Err(AuthError::InvalidPassword)));
        }

        // even the right password is refused while locked
        let result = guard.authenticate_at("1.2.3.4", "letmein", &credential, now);
        assert!(matches!(
            result,
            Err(AuthError::RateLimited {
                retry_after_minutes: 15
            })
        ));

        let result = guard.authenticate_at(
            "1.2.3.4",
            "letmein",
            &credential,
            now + Duration::minutes(16),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_success_clears_failures() {
        let guard = AuthGuard::default();
        let credential = Credential::plain("letmein");

        for _ in 0..4 {
            let _ = guard.authenticate("5.6.7.8", "nope", &credential);
        }
        assert_eq!(guard.limiter().window("5.6.7.8").map(|w| w.count), Some(4));

        let verification = guard.authenticate("5.6.7.8", "letmein", &credential).unwrap();
        assert!(verification.valid);
        assert!(verification.migrated.is_some());
        assert!(guard.limiter().check("5.6.7.8").is_allowed());
        assert!(guard.limiter().window("5.6.7.8").is_none());
    }

    #[test]
    fn test_parallel_guesses_are_capped() {
        use std::sync::{Arc, Barrier};

        let guard = Arc::new(AuthGuard::default());
        let hasher = guard.hasher().clone();
        let salt = hasher.generate_salt();
        let credential = Arc::new(Credential::hashed(hasher.hash("letmein", &salt), salt));
        let barrier = Arc::new(Barrier::new(32));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let guard = Arc::clone(&guard);
                let credential = Arc::clone(&credential);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    guard.authenticate("10.9.8.7", &format!("guess{}", i), &credential)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let evaluated = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::InvalidPassword)))
            .count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::RateLimited { .. })))
            .count();

        assert_eq!(evaluated, 5);
        assert_eq!(refused, 27);
        assert_eq!(guard.limiter().window("10.9.8.7").map(|w| w.count), Some(5));
    }
}
