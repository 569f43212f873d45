//! # One-Time Codes
//!
//! Six-digit codes mailed to the user for password reset and email
//! confirmation. One live code per (email, purpose); issuing again replaces
//! the previous code. Codes are stored as digests and consumed on first
//! successful use. A code is burned once `max_attempts` wrong guesses have
//! been made against it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use super::crypto::{constant_time_str_eq, generate_otp, hash_token};
use super::errors::{AuthError, AuthResult};

/// Wrong guesses allowed against one code
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 5;

/// What a code was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    EmailConfirmation,
    PasswordReset,
}

impl OtpType {
    pub const ALL: &'static [&'static str] = &["email_confirmation", "password_reset"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::EmailConfirmation => "email_confirmation",
            OtpType::PasswordReset => "password_reset",
        }
    }
}

#[derive(Debug, Clone)]
struct OtpEntry {
    code_hash: String,
    expires_at: DateTime<Utc>,
    failed_attempts: u32,
}

/// In-memory code store
///
/// Also tracks reset grants: proof that an address verified a
/// password-reset code recently, spent by the password update.
/// Expired codes and grants are dropped whenever a new one is written.
pub struct OtpStore {
    codes: RwLock<HashMap<(String, OtpType), OtpEntry>>,
    reset_grants: RwLock<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
    max_attempts: u32,
}

impl Default for OtpStore {
    fn default() -> Self {
        Self::new(Duration::minutes(15))
    }
}

fn key(email: &str, kind: OtpType) -> (String, OtpType) {
    (email.to_ascii_lowercase(), kind)
}

fn poisoned() -> AuthError {
    AuthError::StorageError("Lock poisoned".to_string())
}

impl OtpStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: RwLock::new(HashMap::new()),
            reset_grants: RwLock::new(HashMap::new()),
            ttl,
            max_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }

    /// Set how many wrong guesses burn a code
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Issue a code (stores digest, returns raw code)
    pub fn issue(&self, email: &str, kind: OtpType) -> AuthResult<String> {
        let code = generate_otp();
        let now = Utc::now();
        let entry = OtpEntry {
            code_hash: hash_token(&code),
            expires_at: now + self.ttl,
            failed_attempts: 0,
        };

        let mut codes = self.codes.write().map_err(|_| poisoned())?;
        codes.retain(|_, entry| entry.expires_at > now);
        codes.insert(key(email, kind), entry);
        Ok(code)
    }

    /// Check and consume a code.
    ///
    /// A wrong code counts against the live code; the guess that reaches
    /// `max_attempts` burns it and reports [`AuthError::CodeAttemptsExceeded`].
    /// An expired code is dropped.
    pub fn verify_and_consume(&self, email: &str, kind: OtpType, code: &str) -> AuthResult<()> {
        let key = key(email, kind);
        let mut codes = self.codes.write().map_err(|_| poisoned())?;

        let entry = codes.get_mut(&key).ok_or(AuthError::InvalidCode)?;

        if entry.expires_at <= Utc::now() {
            codes.remove(&key);
            return Err(AuthError::InvalidCode);
        }

        if !constant_time_str_eq(&entry.code_hash, &hash_token(code)) {
            entry.failed_attempts += 1;
            if entry.failed_attempts >= self.max_attempts {
                codes.remove(&key);
                return Err(AuthError::CodeAttemptsExceeded);
            }
            return Err(AuthError::InvalidCode);
        }

        codes.remove(&key);
        Ok(())
    }

    /// Record that `email` verified a password-reset code
    pub fn grant_reset(&self, email: &str) -> AuthResult<()> {
        let now = Utc::now();
        let mut grants = self.reset_grants.write().map_err(|_| poisoned())?;
        grants.retain(|_, expires_at| *expires_at > now);
        grants.insert(email.to_ascii_lowercase(), now + self.ttl);
        Ok(())
    }

    /// Spend the reset grant for `email`; `false` when none is live
    pub fn take_reset_grant(&self, email: &str) -> AuthResult<bool> {
        let expires_at = self
            .reset_grants
            .write()
            .map_err(|_| poisoned())?
            .remove(&email.to_ascii_lowercase());

        Ok(matches!(expires_at, Some(at) if at > Utc::now()))
    }

    /// Drop expired codes and grants, returning how many were removed
    pub fn cleanup_expired(&self) -> AuthResult<usize> {
        let now = Utc::now();

        let mut codes = self.codes.write().map_err(|_| poisoned())?;
        let before = codes.len();
        codes.retain(|_, entry| entry.expires_at > now);
        let mut removed = before - codes.len();
        drop(codes);

        let mut grants = self.reset_grants.write().map_err(|_| poisoned())?;
        let before = grants.len();
        grants.retain(|_, expires_at| *expires_at > now);
        removed += before - grants.len();

        Ok(removed)
    }

    /// Codes and grants currently held, live or not
    pub fn tracked(&self) -> AuthResult<usize> {
        let codes = self.codes.read().map_err(|_| poisoned())?.len();
        let grants = self.reset_grants.read().map_err(|_| poisoned())?.len();
        Ok(codes + grants)
    }
}
