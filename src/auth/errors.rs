//! # Auth Errors
//!
//! Error types for the authentication collaborators.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================

    /// Unknown email or wrong password (generic - don't leak which)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Email already registered
    #[error("Email already registered")]
    EmailAlreadyExists,

    /// No account for the given address
    #[error("Account not found")]
    AccountNotFound,

    /// Too many attempts for one key inside the window
    #[error("Too many attempts, retry after {retry_after_secs}s")]
    TooManyAttempts { retry_after_secs: u64 },

    // ==================
    // Token Errors
    // ==================

    /// Session not found, expired or revoked
    #[error("Session expired or invalid")]
    SessionInvalid,

    /// Verification code unknown, expired or already used
    #[error("Invalid or expired code")]
    InvalidCode,

    /// Too many wrong guesses; the code was burned
    #[error("Too many incorrect codes. Please request a new code.")]
    CodeAttemptsExceeded,

    // ==================
    // Internal Errors
    // ==================

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Email delivery failed
    #[error("Email error: {0}")]
    EmailError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            AuthError::InvalidCredentials => 401,
            AuthError::SessionInvalid => 401,
            AuthError::InvalidCode => 401,

            // 404 Not Found
            AuthError::AccountNotFound => 404,

            // 409 Conflict
            AuthError::EmailAlreadyExists => 409,

            // 429 Too Many Requests
            AuthError::TooManyAttempts { .. } => 429,
            AuthError::CodeAttemptsExceeded => 429,

            // 500 Internal Server Error
            AuthError::HashingFailed => 500,
            AuthError::TokenGenerationFailed => 500,
            AuthError::StorageError(_) => 500,
            AuthError::EmailError(_) => 500,
        }
    }

    /// Returns whether the error was caused by the caller
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
