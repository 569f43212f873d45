//! Observable events for formgate
//!
//! Events are explicit and typed. The string form is what appears in the
//! `event` key of every log line.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration loaded and checked
    ConfigLoaded,
    /// Feature schemas built
    FeaturesReady,
    /// HTTP listener bound
    HttpServerListening,
    /// HTTP listener shut down
    HttpServerStopped,
    /// Seed account created from configuration
    SeedUserCreated,

    // Pipeline
    /// Submission failed validation; action not invoked
    ActionRejectedInvalid,
    /// Action completed
    ActionSucceeded,
    /// Action returned an error
    ActionFailed,
    /// Validated fields could not be shaped into the typed input
    TypedInputMismatch,
    /// Dispatch outcome could not be encoded as JSON
    ResultEncodeFailed,

    // Collaborators
    /// Login attempt refused by the rate limiter
    LoginRateLimited,
    /// Email could not be delivered
    EmailSendFailed,
    /// Verification code issued
    OtpIssued,
    /// Code check refused by the rate limiter
    OtpVerifyRateLimited,
    /// Code burned after too many wrong guesses
    OtpBurned,
    /// Account registered through the signup form
    AccountCreated,
    /// Contact form accepted
    ContactSubmitted,
    /// Contact form refused by the rate limiter
    ContactRateLimited,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::FeaturesReady => "FEATURES_READY",
            Event::HttpServerListening => "HTTP_SERVER_LISTENING",
            Event::HttpServerStopped => "HTTP_SERVER_STOPPED",
            Event::SeedUserCreated => "SEED_USER_CREATED",
            Event::ActionRejectedInvalid => "ACTION_REJECTED_INVALID",
            Event::ActionSucceeded => "ACTION_SUCCEEDED",
            Event::ActionFailed => "ACTION_FAILED",
            Event::TypedInputMismatch => "TYPED_INPUT_MISMATCH",
            Event::ResultEncodeFailed => "RESULT_ENCODE_FAILED",
            Event::LoginRateLimited => "LOGIN_RATE_LIMITED",
            Event::EmailSendFailed => "EMAIL_SEND_FAILED",
            Event::OtpIssued => "OTP_ISSUED",
            Event::OtpVerifyRateLimited => "OTP_VERIFY_RATE_LIMITED",
            Event::OtpBurned => "OTP_BURNED",
            Event::AccountCreated => "ACCOUNT_CREATED",
            Event::ContactSubmitted => "CONTACT_SUBMITTED",
            Event::ContactRateLimited => "CONTACT_RATE_LIMITED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
