//! Choose a new password after a verified reset code.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{EmailSender, EmailTemplate, OtpStore, SessionManager, UserRepository};
use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{Action, ActionError, ActionFuture, ActionOutcome, Feature};
use crate::schema::{string, CharClass, FieldDef, Schema, SchemaResult};
use crate::services::Services;

pub const ACCOUNT_UNVERIFIED_MESSAGE: &str =
    "Unable to verify your account. Please request a new password reset.";

pub const RESET_EXPIRED_MESSAGE: &str =
    "Your session has expired. Please request a new password reset.";

/// Password policy shared with signup
pub(crate) fn password_field() -> FieldDef {
    string()
        .min_len(8, "Password must be at least 8 characters")
        .contains(
            CharClass::Lowercase,
            "Password must contain at least one lowercase letter",
        )
        .contains(
            CharClass::Uppercase,
            "Password must contain at least one uppercase letter",
        )
        .contains(CharClass::Digit, "Password must contain at least one number")
}

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("update_password")
        .field(
            "email",
            string()
                .min_len(1, "Email is required")
                .email("Please enter a valid email address"),
        )
        .field("password", password_field())
        .field("confirmPassword", string())
        .refine_match("confirmPassword", "password", "Passwords don't match")
        .build()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordOutput {
    pub redirect_to: String,
    /// Sessions signed out by the change
    pub revoked_sessions: usize,
}

pub struct UpdatePasswordAction {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionManager>,
    otp: Arc<OtpStore>,
    email: Arc<dyn EmailSender>,
}

impl UpdatePasswordAction {
    pub fn new(services: &Services) -> Self {
        Self {
            users: services.users.clone(),
            sessions: services.sessions.clone(),
            otp: services.otp.clone(),
            email: services.email.clone(),
        }
    }

    async fn update(&self, input: UpdatePasswordInput) -> ActionOutcome<UpdatePasswordOutput> {
        let mut user = self
            .users
            .find_by_email(&input.email)?
            .ok_or_else(|| ActionError::rejected(ACCOUNT_UNVERIFIED_MESSAGE))?;

        if !self.otp.take_reset_grant(&user.email)? {
            return Err(ActionError::rejected(RESET_EXPIRED_MESSAGE));
        }

        user.set_password(&input.password)?;
        self.users.update(&user)?;
        let revoked_sessions = self.sessions.revoke_all_user_sessions(user.id)?;

        let notice = EmailTemplate::PasswordChanged {
            user_email: user.email.clone(),
        };
        if let Err(err) = self.email.send(notice).await {
            let cause = err.to_string();
            Logger::emit(
                Severity::Warn,
                Event::EmailSendFailed,
                &[("cause", &cause), ("template", "password_changed")],
            );
        }

        Ok(UpdatePasswordOutput {
            redirect_to: "/login?reason=password_updated".to_string(),
            revoked_sessions,
        })
    }
}

impl Action for UpdatePasswordAction {
    type Input = UpdatePasswordInput;
    type Output = UpdatePasswordOutput;

    fn name(&self) -> &'static str {
        "update_password"
    }

    fn run(&self, input: UpdatePasswordInput) -> ActionFuture<'_, UpdatePasswordOutput> {
        Box::pin(self.update(input))
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<UpdatePasswordAction>> {
    Ok(Feature::new(schema()?, UpdatePasswordAction::new(services))
        .with_invalid_message("Please check your password requirements")
        .with_general_message(
            "Failed to update your password. Please try again or contact support.",
        ))
}
