//! # Action Errors
//!
//! Failures reported by actions after validation succeeded.

use thiserror::Error;

use crate::auth::AuthError;
use crate::stores::StoreError;

/// Result type returned by actions
pub type ActionOutcome<T> = Result<T, ActionError>;

/// Downstream failure of an action.
///
/// The `Display` text is the cause recorded in logs. What the caller sees
/// comes from [`ActionError::public_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Refused with a message written for the end user
    #[error("rejected: {0}")]
    Rejected(String),

    /// Too many attempts in the current window
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// External service unreachable
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Persistence failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Email delivery failed
    #[error("email error: {0}")]
    Email(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Create a user-facing rejection
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Short machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::Rejected(_) => "rejected",
            ActionError::RateLimited { .. } => "rate_limited",
            ActionError::Unavailable(_) => "unavailable",
            ActionError::Storage(_) => "storage",
            ActionError::Email(_) => "email",
            ActionError::Internal(_) => "internal",
        }
    }

    /// Whether the failure was caused by the submission rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, ActionError::Rejected(_) | ActionError::RateLimited { .. })
    }

    /// Message shown to the caller.
    ///
    /// Only explicit rejections and rate limits carry their own text;
    /// everything else collapses to the feature's `fallback`.
    pub fn public_message(&self, fallback: &str) -> String {
        match self {
            ActionError::Rejected(message) => message.clone(),
            ActionError::RateLimited { retry_after_secs } => format!(
                "Too many attempts. Please try again in {} seconds.",
                retry_after_secs
            ),
            _ => fallback.to_string(),
        }
    }
}

impl From<AuthError> for ActionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::StorageError(cause) => ActionError::Storage(cause),
            AuthError::EmailError(cause) => ActionError::Email(cause),
            AuthError::TooManyAttempts { retry_after_secs } => {
                ActionError::RateLimited { retry_after_secs }
            }
            AuthError::HashingFailed | AuthError::TokenGenerationFailed => {
                ActionError::Internal(err.to_string())
            }
            other if other.is_client_error() => ActionError::Rejected(other.to_string()),
            other => ActionError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ActionError::Rejected(format!("{} not found", what)),
            StoreError::Unavailable(cause) => ActionError::Unavailable(cause),
            StoreError::Storage(cause) => ActionError::Storage(cause),
        }
    }
}
