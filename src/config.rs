//! # Configuration
//!
//! Process configuration, loaded once at startup from a JSON file. Every
//! field has a default, so `{}` is a valid configuration.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::otp::DEFAULT_MAX_CODE_ATTEMPTS;
use crate::auth::{EmailConfig, RateLimitConfig, Role, SessionConfig};
use crate::http_server::HttpServerConfig;

/// Longest accepted limiter window (one day)
const MAX_WINDOW_SECS: u64 = 86_400;

/// Longest accepted code lifetime (one day)
const MAX_OTP_TTL_MINUTES: u64 = 1_440;

/// Longest accepted session lifetime (one year)
const MAX_SESSION_HOURS: u64 = 8_760;

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// Login attempt limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRateLimitSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_attempts() -> u32 {
    5
}
fn default_window_secs() -> u64 {
    300
}

impl Default for LoginRateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

/// One-time code settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSettings {
    #[serde(default = "default_otp_ttl_minutes")]
    pub ttl_minutes: u64,

    /// Wrong guesses that burn a code
    #[serde(default = "default_otp_max_attempts")]
    pub max_attempts: u32,
}

fn default_otp_ttl_minutes() -> u64 {
    15
}
fn default_otp_max_attempts() -> u32 {
    DEFAULT_MAX_CODE_ATTEMPTS
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: default_otp_ttl_minutes(),
            max_attempts: default_otp_max_attempts(),
        }
    }
}

/// Contact form submissions per sender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRateLimitSettings {
    #[serde(default = "default_contact_max_submissions")]
    pub max_submissions: u32,

    #[serde(default = "default_contact_window_secs")]
    pub window_secs: u64,
}

fn default_contact_max_submissions() -> u32 {
    3
}
fn default_contact_window_secs() -> u64 {
    3_600
}

impl Default for ContactRateLimitSettings {
    fn default() -> Self {
        Self {
            max_submissions: default_contact_max_submissions(),
            window_secs: default_contact_window_secs(),
        }
    }
}

/// Session lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_session_hours")]
    pub ttl_hours: u64,

    /// Lifetime when the login form's "remember me" box is ticked
    #[serde(default = "default_remember_days")]
    pub remember_days: u64,
}

fn default_session_hours() -> u64 {
    12
}
fn default_remember_days() -> u64 {
    30
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_hours(),
            remember_days: default_remember_days(),
        }
    }
}

/// Account created at boot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Client
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpServerConfig,

    /// SMTP settings; without them mail is captured in memory
    #[serde(default)]
    pub email: Option<EmailConfig>,

    #[serde(default)]
    pub login_rate_limit: LoginRateLimitSettings,

    #[serde(default)]
    pub contact_rate_limit: ContactRateLimitSettings,

    #[serde(default)]
    pub otp: OtpSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub seed_users: Vec<SeedUser>,
}

impl AppConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would disable a safeguard or overflow a lifetime
    pub fn validate(&self) -> ConfigResult<()> {
        if self.http.port == 0 {
            return Err(invalid("http.port must be > 0"));
        }

        let limit = &self.login_rate_limit;
        if limit.max_attempts == 0 {
            return Err(invalid("login_rate_limit.max_attempts must be > 0"));
        }
        if limit.window_secs == 0 || limit.window_secs > MAX_WINDOW_SECS {
            return Err(invalid(format!(
                "login_rate_limit.window_secs must be between 1 and {}",
                MAX_WINDOW_SECS
            )));
        }

        let contact = &self.contact_rate_limit;
        if contact.max_submissions == 0 {
            return Err(invalid("contact_rate_limit.max_submissions must be > 0"));
        }
        if contact.window_secs == 0 || contact.window_secs > MAX_WINDOW_SECS {
            return Err(invalid(format!(
                "contact_rate_limit.window_secs must be between 1 and {}",
                MAX_WINDOW_SECS
            )));
        }

        if self.otp.max_attempts == 0 {
            return Err(invalid("otp.max_attempts must be > 0"));
        }
        if self.otp.ttl_minutes == 0 || self.otp.ttl_minutes > MAX_OTP_TTL_MINUTES {
            return Err(invalid(format!(
                "otp.ttl_minutes must be between 1 and {}",
                MAX_OTP_TTL_MINUTES
            )));
        }

        let session = &self.session;
        if session.ttl_hours == 0 || session.ttl_hours > MAX_SESSION_HOURS {
            return Err(invalid(format!(
                "session.ttl_hours must be between 1 and {}",
                MAX_SESSION_HOURS
            )));
        }
        if session.remember_days == 0 || session.remember_days > MAX_SESSION_HOURS / 24 {
            return Err(invalid(format!(
                "session.remember_days must be between 1 and {}",
                MAX_SESSION_HOURS / 24
            )));
        }

        for (i, user) in self.seed_users.iter().enumerate() {
            if user.email.trim().is_empty() || user.password.is_empty() {
                return Err(invalid(format!(
                    "seed_users[{}] needs both email and password",
                    i
                )));
            }
        }

        Ok(())
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_attempts: self.login_rate_limit.max_attempts,
            window: Duration::seconds(self.login_rate_limit.window_secs as i64),
        }
    }

    pub fn contact_rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_attempts: self.contact_rate_limit.max_submissions,
            window: Duration::seconds(self.contact_rate_limit.window_secs as i64),
        }
    }

    pub fn otp_ttl(&self) -> Duration {
        Duration::minutes(self.otp.ttl_minutes as i64)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ttl: Duration::hours(self.session.ttl_hours as i64),
            remember_ttl: Duration::days(self.session.remember_days as i64),
        }
    }
}
