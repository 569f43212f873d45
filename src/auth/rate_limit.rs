//! # Attempt Limiting
//!
//! Fixed-window attempt counter keyed by an identifier (the login email).
//! The window opens on the first attempt; once `max_attempts` have been
//! counted, further attempts are refused until it closes.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use super::errors::{AuthError, AuthResult};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed per window
    pub max_attempts: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::minutes(5),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// In-memory attempt limiter
#[derive(Debug, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: RwLock<HashMap<String, Window>>,
}

fn poisoned() -> AuthError {
    AuthError::StorageError("Lock poisoned".to_string())
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count an attempt for `key` now
    pub fn check(&self, key: &str) -> AuthResult<()> {
        self.check_at(key, Utc::now())
    }

    /// Count an attempt for `key` at `now`.
    ///
    /// Refused attempts are not counted and do not extend the window.
    /// Opening a new window drops every window that has already closed.
    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> AuthResult<()> {
        let key = key.to_ascii_lowercase();
        let mut windows = self.windows.write().map_err(|_| poisoned())?;

        match windows.get_mut(&key) {
            Some(window) if window.reset_at > now => {
                if window.count >= self.config.max_attempts {
                    let remaining = (window.reset_at - now).num_milliseconds();
                    // Round up so callers never retry a moment too early
                    let retry_after_secs = ((remaining + 999) / 1000).max(1) as u64;
                    return Err(AuthError::TooManyAttempts { retry_after_secs });
                }
                window.count += 1;
            }
            _ => {
                windows.retain(|_, window| window.reset_at > now);
                windows.insert(
                    key,
                    Window {
                        count: 1,
                        reset_at: now + self.config.window,
                    },
                );
            }
        }

        Ok(())
    }

    /// Keys with a window currently held
    pub fn tracked_keys(&self) -> AuthResult<usize> {
        Ok(self.windows.read().map_err(|_| poisoned())?.len())
    }

    /// Forget all attempts for `key`
    pub fn clear(&self, key: &str) -> AuthResult<()> {
        self.windows
            .write()
            .map_err(|_| poisoned())?
            .remove(&key.to_ascii_lowercase());
        Ok(())
    }
}
