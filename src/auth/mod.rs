//! # Auth Collaborators
//!
//! Accounts, sessions, one-time codes, attempt limiting and outbound
//! email. The auth features in [`crate::features`] call into these; none
//! of them know about schemas or the pipeline.

pub mod crypto;
pub mod email;
pub mod errors;
pub mod otp;
pub mod rate_limit;
pub mod session;
pub mod user;

pub use email::{create_email_sender, EmailConfig, EmailSender, EmailTemplate, MockEmailSender};
pub use errors::{AuthError, AuthResult};
pub use otp::{OtpStore, OtpType};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use session::{Session, SessionConfig, SessionManager};
pub use user::{InMemoryUserRepository, Role, User, UserRepository};
