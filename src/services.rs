//! # Services
//!
//! The collaborators actions call into, constructed once at process start
//! and shared by reference. Nothing here is global; every feature receives
//! the `Services` it was built with.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{
    create_email_sender, AuthResult, EmailSender, InMemoryUserRepository, MockEmailSender,
    OtpStore, RateLimitConfig, RateLimiter, Role, SessionConfig, SessionManager, User,
    UserRepository,
};
use crate::config::AppConfig;
use crate::observability::{Event, Logger, Severity};
use crate::stores::{
    InMemoryNotificationStore, InMemoryPaymentMethodStore, InMemorySettingsStore,
    InMemoryTicketStore, NotificationStore, PaymentMethodStore, SettingsStore, TicketStore,
};

#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<SessionManager>,
    pub otp: Arc<OtpStore>,
    pub login_limiter: Arc<RateLimiter>,
    /// Code checks per email, across reissued codes
    pub verify_limiter: Arc<RateLimiter>,
    pub contact_limiter: Arc<RateLimiter>,
    pub email: Arc<dyn EmailSender>,
    pub payment_methods: Arc<dyn PaymentMethodStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub tickets: Arc<dyn TicketStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Services {
    /// Default in-memory collaborators with a capturing email sender
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: Arc::new(SessionManager::in_memory(SessionConfig::default())),
            otp: Arc::new(OtpStore::default()),
            login_limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
            verify_limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
            contact_limiter: Arc::new(RateLimiter::new(RateLimitConfig {
                max_attempts: 3,
                window: Duration::hours(1),
            })),
            email: Arc::new(MockEmailSender::new()),
            payment_methods: Arc::new(InMemoryPaymentMethodStore::new()),
            settings: Arc::new(InMemorySettingsStore::default()),
            tickets: Arc::new(InMemoryTicketStore::new()),
            notifications: Arc::new(InMemoryNotificationStore::new()),
        }
    }

    /// Collaborators configured from `config`, with seed accounts created
    pub fn from_config(config: &AppConfig) -> AuthResult<Self> {
        let services = Self {
            sessions: Arc::new(SessionManager::in_memory(config.session_config())),
            otp: Arc::new(
                OtpStore::new(config.otp_ttl()).with_max_attempts(config.otp.max_attempts),
            ),
            login_limiter: Arc::new(RateLimiter::new(config.rate_limit_config())),
            verify_limiter: Arc::new(RateLimiter::new(config.rate_limit_config())),
            contact_limiter: Arc::new(RateLimiter::new(config.contact_rate_limit_config())),
            email: create_email_sender(config.email.clone()),
            ..Self::in_memory()
        };

        for seed in &config.seed_users {
            services.seed_user(&seed.email, &seed.password, seed.role)?;
        }

        Ok(services)
    }

    /// Replace the email sender
    pub fn with_email_sender(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email = sender;
        self
    }

    /// Create an account directly, bypassing any form
    pub fn seed_user(&self, email: &str, password: &str, role: Role) -> AuthResult<User> {
        let user = User::new(email, password, role)?;
        self.users.create(&user)?;

        let user_id = user.id.to_string();
        Logger::emit(
            Severity::Info,
            Event::SeedUserCreated,
            &[("role", role.as_str()), ("user_id", &user_id)],
        );
        Ok(user)
    }
}
