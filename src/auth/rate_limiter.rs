//! Sliding-window login lockout.
//!
//! Per client identifier the limiter moves through three states:
//!
//! - **Clear**: no window exists, attempts are allowed
//! - **Tracking**: failures recorded, still below `max_attempts`
//! - **Locked**: `max_attempts` failures inside the window; attempts are
//!   refused until the window (started at the first failure) runs out
//!
//! A successful login returns the identifier to Clear immediately.
//!
//! Logins reserve their attempt with [`RateLimiter::try_begin_attempt`]
//! before the password is checked, so a burst of parallel requests from one
//! client gets at most `max_attempts` guesses per window.

use crate::auth::{AuthError, AuthResult};
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

/// Failed attempts recorded for one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptWindow {
    /// Failures since `window_start`, at least 1
    pub count: u32,
    /// Time of the first failure in this window
    pub window_start: DateTime<Utc>,
}

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RateLimitStatus {
    Allowed,
    Locked {
        /// Minutes until the window expires, rounded up
        retry_after_minutes: u64,
    },
}

impl RateLimitStatus {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitStatus::Allowed)
    }
}

/// In-memory attempt tracker keyed by client identifier.
///
/// All read-check-write sequences for one identifier run under that key's
/// entry lock, so concurrent requests from the same client cannot lose
/// increments or resurrect an expired window.
#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: u32,
    lockout_duration: Duration,
    windows: DashMap<String, AttemptWindow>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            max_attempts,
            lockout_duration,
            windows: DashMap::new(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn lockout_duration(&self) -> Duration {
        self.lockout_duration
    }

    /// Check whether `id` may attempt a login now
    pub fn check(&self, id: &str) -> RateLimitStatus {
        self.check_at(id, Utc::now())
    }

    pub fn check_at(&self, id: &str, now: DateTime<Utc>) -> RateLimitStatus {
        let Entry::Occupied(entry) = self.windows.entry(id.to_string()) else {
            return RateLimitStatus::Allowed;
        };

        let window = *entry.get();
        let elapsed = now.signed_duration_since(window.window_start);

        if elapsed > self.lockout_duration {
            entry.remove();
            debug!(client_id = %id, "Attempt window expired");
            return RateLimitStatus::Allowed;
        }

        if window.count >= self.max_attempts {
            RateLimitStatus::Locked {
                retry_after_minutes: minutes_rounded_up(self.lockout_duration - elapsed),
            }
        } else {
            RateLimitStatus::Allowed
        }
    }

    /// Reserve one login attempt for `id`.
    ///
    /// Expiry, the lock check and the increment run under the key's entry
    /// lock. The reserved attempt stays counted as a failure unless the
    /// caller follows up with [`RateLimiter::clear`]. Refused attempts are not
    /// counted.
    pub fn try_begin_attempt(&self, id: &str) -> AuthResult<AttemptWindow> {
        self.try_begin_attempt_at(id, Utc::now())
    }

    pub fn try_begin_attempt_at(&self, id: &str, now: DateTime<Utc>) -> AuthResult<AttemptWindow> {
        let mut window = self.windows.entry(id.to_string()).or_insert(AttemptWindow {
            count: 0,
            window_start: now,
        });

        let elapsed = now.signed_duration_since(window.window_start);
        if elapsed > self.lockout_duration {
            *window = AttemptWindow {
                count: 0,
                window_start: now,
            };
        } else if window.count >= self.max_attempts {
            return Err(AuthError::RateLimited {
                retry_after_minutes: minutes_rounded_up(self.lockout_duration - elapsed),
            });
        }

        window.count = window.count.saturating_add(1);
        Ok(*window)
    }

    /// Record a failed attempt and return the updated window
    pub fn record_failure(&self, id: &str) -> AttemptWindow {
        self.record_failure_at(id, Utc::now())
    }

    pub fn record_failure_at(&self, id: &str, now: DateTime<Utc>) -> AttemptWindow {
        let mut window = self.windows.entry(id.to_string()).or_insert(AttemptWindow {
            count: 0,
            window_start: now,
        });

        if now.signed_duration_since(window.window_start) > self.lockout_duration {
            *window = AttemptWindow {
                count: 1,
                window_start: now,
            };
        } else {
            window.count = window.count.saturating_add(1);
        }

        *window
    }

    /// Forget every failure recorded for `id`
    pub fn clear(&self, id: &str) {
        if self.windows.remove(id).is_some() {
            debug!(client_id = %id, "Attempt window cleared");
        }
    }

    /// Current window for `id`, if any
    pub fn window(&self, id: &str) -> Option<AttemptWindow> {
        self.windows.get(id).map(|entry| *entry)
    }

    /// Drop expired windows; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            now.signed_duration_since(window.window_start) <= self.lockout_duration
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of identifiers currently tracked
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

fn minutes_rounded_up(remaining: Duration) -> u64 {
    let millis = remaining.num_milliseconds().max(0) as u64;
    millis.div_ceil(60_000)
}
