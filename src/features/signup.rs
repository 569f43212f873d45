//! Register a client account and mail an email-confirmation code.
//!
//! The account starts unverified. `verify_otp` with
//! `type=email_confirmation` marks it verified.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::update_password::password_field;
use super::with_query;
use crate::auth::{EmailSender, EmailTemplate, OtpStore, OtpType, Role, User, UserRepository};
use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{Action, ActionFuture, ActionOutcome, Feature};
use crate::schema::{string, Schema, SchemaResult};
use crate::services::Services;

pub const CHECK_EMAIL_MESSAGE: &str = "Check your email for verification code";

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("signup")
        .field(
            "email",
            string()
                .min_len(1, "Email is required")
                .email("Please enter a valid email address"),
        )
        .field(
            "companyName",
            string()
                .trim()
                .min_len(2, "Company name must be at least 2 characters")
                .max_len(100, "Company name must be less than 100 characters"),
        )
        .field("password", password_field())
        .field("confirmPassword", string())
        .refine_match("confirmPassword", "password", "Passwords don't match")
        .build()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub email: String,
    pub company_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupOutput {
    pub profile_id: Uuid,
    pub redirect_to: String,
    pub message: String,
}

pub struct SignupAction {
    users: Arc<dyn UserRepository>,
    otp: Arc<OtpStore>,
    email: Arc<dyn EmailSender>,
}

impl SignupAction {
    pub fn new(services: &Services) -> Self {
        Self {
            users: services.users.clone(),
            otp: services.otp.clone(),
            email: services.email.clone(),
        }
    }

    async fn register(&self, input: SignupInput) -> ActionOutcome<SignupOutput> {
        let user = User::new(input.email.as_str(), &input.password, Role::Client)?
            .with_company_name(input.company_name);
        self.users.create(&user)?;

        let user_id = user.id.to_string();
        Logger::emit(Severity::Info, Event::AccountCreated, &[("user_id", &user_id)]);

        let code = self.otp.issue(&user.email, OtpType::EmailConfirmation)?;
        Logger::emit(
            Severity::Info,
            Event::OtpIssued,
            &[("type", OtpType::EmailConfirmation.as_str())],
        );

        // Without the code the account cannot be confirmed, so delivery
        // failure is reported
        self.email
            .send(EmailTemplate::EmailConfirmationCode {
                user_email: user.email.clone(),
                code,
                expires_minutes: self.otp.ttl().num_minutes(),
            })
            .await?;

        let redirect_to = with_query(
            "/verify-otp",
            &[
                ("email", user.email.as_str()),
                ("type", OtpType::EmailConfirmation.as_str()),
            ],
        )?;

        Ok(SignupOutput {
            profile_id: user.id,
            redirect_to,
            message: CHECK_EMAIL_MESSAGE.to_string(),
        })
    }
}

impl Action for SignupAction {
    type Input = SignupInput;
    type Output = SignupOutput;

    fn name(&self) -> &'static str {
        "signup"
    }

    fn run(&self, input: SignupInput) -> ActionFuture<'_, SignupOutput> {
        Box::pin(self.register(input))
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<SignupAction>> {
    Ok(Feature::new(schema()?, SignupAction::new(services))
        .with_invalid_message("Please check your password requirements")
        .with_general_message("Unable to create your account. Please try again."))
}
