//! Start a password reset by mailing a one-time code.
//!
//! The outcome never reveals whether an account exists: every valid
//! submission gets the same redirect, and delivery failures are logged
//! rather than reported.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::with_query;
use crate::auth::{EmailSender, EmailTemplate, OtpStore, OtpType, UserRepository};
use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{Action, ActionFuture, ActionOutcome, Feature};
use crate::schema::{string, Schema, SchemaResult};
use crate::services::Services;

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("reset_password")
        .field(
            "email",
            string()
                .min_len(1, "Email is required")
                .email("Please enter a valid email address"),
        )
        .build()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordInput {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordOutput {
    pub redirect_to: String,
}

pub struct ResetPasswordAction {
    users: Arc<dyn UserRepository>,
    otp: Arc<OtpStore>,
    email: Arc<dyn EmailSender>,
}

impl ResetPasswordAction {
    pub fn new(services: &Services) -> Self {
        Self {
            users: services.users.clone(),
            otp: services.otp.clone(),
            email: services.email.clone(),
        }
    }

    async fn start_reset(&self, input: ResetPasswordInput) -> ActionOutcome<ResetPasswordOutput> {
        if let Some(user) = self.users.find_by_email(&input.email)? {
            let code = self.otp.issue(&user.email, OtpType::PasswordReset)?;
            Logger::emit(
                Severity::Info,
                Event::OtpIssued,
                &[("type", OtpType::PasswordReset.as_str())],
            );

            let template = EmailTemplate::PasswordResetCode {
                user_email: user.email.clone(),
                code,
                expires_minutes: self.otp.ttl().num_minutes(),
            };
            if let Err(err) = self.email.send(template).await {
                let cause = err.to_string();
                Logger::emit(
                    Severity::Warn,
                    Event::EmailSendFailed,
                    &[("cause", &cause), ("template", "password_reset_code")],
                );
            }
        }

        let redirect_to = with_query(
            "/verify-otp",
            &[
                ("email", input.email.as_str()),
                ("type", OtpType::PasswordReset.as_str()),
            ],
        )?;
        Ok(ResetPasswordOutput { redirect_to })
    }
}

impl Action for ResetPasswordAction {
    type Input = ResetPasswordInput;
    type Output = ResetPasswordOutput;

    fn name(&self) -> &'static str {
        "reset_password"
    }

    fn run(&self, input: ResetPasswordInput) -> ActionFuture<'_, ResetPasswordOutput> {
        Box::pin(self.start_reset(input))
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<ResetPasswordAction>> {
    Ok(Feature::new(schema()?, ResetPasswordAction::new(services))
        .with_general_message("Unable to start password reset."))
}
