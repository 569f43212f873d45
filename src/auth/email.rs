//! # Email Integration
//!
//! Outbound email for the auth and support flows.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::auth::errors::{AuthError, AuthResult};

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP server host
    pub smtp_host: String,

    /// SMTP server port
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_user: String,

    /// SMTP password (should come from secrets)
    #[serde(skip_serializing)]
    pub smtp_password: String,

    /// From email address
    pub from_email: String,

    /// From name
    pub from_name: String,

    /// Base URL for links
    pub base_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@formgate.local".to_string(),
            from_name: "Support".to_string(),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Email template types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Password reset code
    PasswordResetCode {
        user_email: String,
        code: String,
        expires_minutes: i64,
    },

    /// Email confirmation code sent after signup
    EmailConfirmationCode {
        user_email: String,
        code: String,
        expires_minutes: i64,
    },

    /// Password changed notification
    PasswordChanged { user_email: String },

    /// Support ticket received
    TicketCreated {
        user_email: String,
        ticket_id: String,
        subject: String,
    },
}

impl EmailTemplate {
    /// Recipient address
    pub fn recipient(&self) -> &str {
        match self {
            EmailTemplate::PasswordResetCode { user_email, .. }
            | EmailTemplate::EmailConfirmationCode { user_email, .. }
            | EmailTemplate::PasswordChanged { user_email }
            | EmailTemplate::TicketCreated { user_email, .. } => user_email,
        }
    }

    /// Short template name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            EmailTemplate::PasswordResetCode { .. } => "password_reset_code",
            EmailTemplate::EmailConfirmationCode { .. } => "email_confirmation_code",
            EmailTemplate::PasswordChanged { .. } => "password_changed",
            EmailTemplate::TicketCreated { .. } => "ticket_created",
        }
    }

    /// Render (subject, body)
    pub fn render(&self, config: &EmailConfig) -> (String, String) {
        match self {
            EmailTemplate::PasswordResetCode {
                code,
                expires_minutes,
                ..
            } => {
                let subject = "Your password reset code".to_string();
                let body = format!(
                    "Hello,\n\n\
                    Use the code below to reset your password:\n\n\
                    {}\n\n\
                    Enter it at {}/verify-otp?type=password_reset\n\n\
                    This code will expire in {} minutes.\n\n\
                    If you didn't request this, you can ignore this email.\n\n\
                    Thanks,\n\
                    {}",
                    code, config.base_url, expires_minutes, config.from_name
                );
                (subject, body)
            }
            EmailTemplate::EmailConfirmationCode {
                code,
                expires_minutes,
                ..
            } => {
                let subject = "Confirm your email address".to_string();
                let body = format!(
                    "Welcome!\n\n\
                    Use the code below to confirm your email address:\n\n\
                    {}\n\n\
                    Enter it at {}/verify-otp?type=email_confirmation\n\n\
                    This code will expire in {} minutes.\n\n\
                    Thanks,\n\
                    {}",
                    code, config.base_url, expires_minutes, config.from_name
                );
                (subject, body)
            }
            EmailTemplate::PasswordChanged { .. } => {
                let subject = "Your password was changed".to_string();
                let body = format!(
                    "Hello,\n\n\
                    Your password was successfully changed.\n\n\
                    If you didn't make this change, please contact support immediately.\n\n\
                    Thanks,\n\
                    {}",
                    config.from_name
                );
                (subject, body)
            }
            EmailTemplate::TicketCreated {
                ticket_id, subject, ..
            } => {
                let title = format!("We received your request: {}", subject);
                let body = format!(
                    "Hello,\n\n\
                    Thanks for contacting us. Your ticket reference is {}.\n\n\
                    You can follow it at {}/client/support\n\n\
                    Thanks,\n\
                    {}",
                    ticket_id, config.base_url, config.from_name
                );
                (title, body)
            }
        }
    }
}

/// Future returned by [`EmailSender::send`]
pub type EmailFuture<'a> = Pin<Box<dyn Future<Output = AuthResult<()>> + Send + 'a>>;

/// Email sender trait for abstraction
pub trait EmailSender: Send + Sync {
    /// Send an email
    fn send(&self, template: EmailTemplate) -> EmailFuture<'_>;
}

/// Mock email sender for testing
#[derive(Debug, Default)]
pub struct MockEmailSender {
    sent: RwLock<Vec<EmailTemplate>>,
    fail_with: Option<String>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails with `cause`
    pub fn failing(cause: impl Into<String>) -> Self {
        Self {
            sent: RwLock::default(),
            fail_with: Some(cause.into()),
        }
    }

    /// Emails delivered so far
    pub fn sent(&self) -> Vec<EmailTemplate> {
        self.sent.read().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Get number of sent emails
    pub fn sent_count(&self) -> usize {
        self.sent.read().map(|sent| sent.len()).unwrap_or(0)
    }
}

impl EmailSender for MockEmailSender {
    fn send(&self, template: EmailTemplate) -> EmailFuture<'_> {
        let outcome = match &self.fail_with {
            Some(cause) => Err(AuthError::EmailError(cause.clone())),
            None => self
                .sent
                .write()
                .map(|mut sent| sent.push(template))
                .map_err(|_| AuthError::StorageError("Lock poisoned".to_string())),
        };
        Box::pin(async move { outcome })
    }
}

/// SMTP email sender
pub struct SmtpEmailSender {
    config: EmailConfig,
}

impl SmtpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, template: &EmailTemplate) -> AuthResult<lettre::Message> {
        use lettre::message::header::ContentType;

        let (subject, body) = template.render(&self.config);

        lettre::Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| AuthError::EmailError(format!("Invalid from address: {}", e)))?,
            )
            .to(template
                .recipient()
                .parse()
                .map_err(|e| AuthError::EmailError(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AuthError::EmailError(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AuthResult<lettre::AsyncSmtpTransport<lettre::Tokio1Executor>> {
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{AsyncSmtpTransport, Tokio1Executor};

        if self.config.smtp_user.is_empty() {
            // No authentication (for local development SMTP servers)
            return Ok(
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
                    .port(self.config.smtp_port)
                    .build(),
            );
        }

        let creds = Credentials::new(
            self.config.smtp_user.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| AuthError::EmailError(format!("SMTP relay error: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build())
    }
}

impl EmailSender for SmtpEmailSender {
    fn send(&self, template: EmailTemplate) -> EmailFuture<'_> {
        Box::pin(async move {
            use lettre::AsyncTransport;

            let email = self.build_message(&template)?;
            self.transport()?
                .send(email)
                .await
                .map_err(|e| AuthError::EmailError(format!("Failed to send email: {}", e)))?;

            Ok(())
        })
    }
}

/// Create a shared email sender based on config
pub fn create_email_sender(config: Option<EmailConfig>) -> Arc<dyn EmailSender> {
    match config {
        Some(cfg) => Arc::new(SmtpEmailSender::new(cfg)),
        None => Arc::new(MockEmailSender::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_email_sender() {
        let sender = MockEmailSender::new();

        sender
            .send(EmailTemplate::PasswordChanged {
                user_email: "test@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(sender.sent_count(), 1);
        assert_eq!(sender.sent()[0].recipient(), "test@example.com");
    }

    #[tokio::test]
    async fn test_failing_sender_reports_email_error() {
        let sender = MockEmailSender::failing("relay down");
        let err = sender
            .send(EmailTemplate::PasswordChanged {
                user_email: "test@example.com".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::EmailError("relay down".to_string()));
        assert_eq!(sender.sent_count(), 0);
    }

    #[test]
    fn test_reset_code_rendering() {
        let (subject, body) = EmailTemplate::PasswordResetCode {
            user_email: "user@example.com".to_string(),
            code: "042917".to_string(),
            expires_minutes: 15,
        }
        .render(&EmailConfig::default());

        assert_eq!(subject, "Your password reset code");
        assert!(body.contains("042917"));
        assert!(body.contains("15 minutes"));
    }

    #[test]
    fn test_confirmation_code_rendering() {
        let template = EmailTemplate::EmailConfirmationCode {
            user_email: "new@example.com".to_string(),
            code: "550013".to_string(),
            expires_minutes: 15,
        };
        let (subject, body) = template.render(&EmailConfig::default());

        assert_eq!(template.kind(), "email_confirmation_code");
        assert_eq!(template.recipient(), "new@example.com");
        assert_eq!(subject, "Confirm your email address");
        assert!(body.contains("550013"));
        assert!(body.contains("type=email_confirmation"));
    }

    #[test]
    fn test_message_build_rejects_bad_recipient() {
        let sender = SmtpEmailSender::new(EmailConfig::default());
        let result = sender.build_message(&EmailTemplate::PasswordChanged {
            user_email: "not an address".to_string(),
        });
        assert!(matches!(result, Err(AuthError::EmailError(_))));
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: EmailConfig =
            serde_json::from_str(r#"{"smtp_host": "smtp.example.com"}"#).unwrap();
        assert_eq!(config.smtp_host, "smtp.example.com");
        assert_eq!(config.smtp_port, 1025);
    }
}
