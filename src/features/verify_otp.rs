//! Check a mailed one-time code.
//!
//! Checks are limited per email across reissued codes, and each code
//! burns after a few wrong guesses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vocab::OtpType;
use super::with_query;
use crate::auth::{AuthError, OtpStore, RateLimiter, UserRepository};
use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{Action, ActionFuture, ActionOutcome, Feature};
use crate::schema::{one_of, string, Schema, SchemaResult};
use crate::services::Services;

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("verify_otp")
        .field(
            "email",
            string()
                .min_len(1, "Email is required")
                .email("Please enter a valid email address"),
        )
        .field(
            "otp",
            string()
                .min_len(6, "Your one-time password must be 6 characters.")
                .max_len(6, "Your one-time password must be 6 characters.")
                .digits("Your one-time password must contain only digits."),
        )
        .field("type", one_of(OtpType::ALL))
        .build()
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
    #[serde(rename = "type")]
    pub otp_type: OtpType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpOutput {
    pub profile_id: Option<Uuid>,
    pub redirect_to: String,
}

pub struct VerifyOtpAction {
    users: Arc<dyn UserRepository>,
    otp: Arc<OtpStore>,
    limiter: Arc<RateLimiter>,
}

impl VerifyOtpAction {
    pub fn new(services: &Services) -> Self {
        Self {
            users: services.users.clone(),
            otp: services.otp.clone(),
            limiter: services.verify_limiter.clone(),
        }
    }

    fn verify(&self, input: VerifyOtpInput) -> ActionOutcome<VerifyOtpOutput> {
        if let Err(err) = self.limiter.check(&input.email) {
            if let AuthError::TooManyAttempts { retry_after_secs } = &err {
                let retry = retry_after_secs.to_string();
                Logger::emit(
                    Severity::Warn,
                    Event::OtpVerifyRateLimited,
                    &[("retry_after_secs", &retry)],
                );
            }
            return Err(err.into());
        }

        match self
            .otp
            .verify_and_consume(&input.email, input.otp_type, &input.otp)
        {
            Ok(()) => {}
            Err(AuthError::CodeAttemptsExceeded) => {
                Logger::emit(
                    Severity::Warn,
                    Event::OtpBurned,
                    &[("type", input.otp_type.as_str())],
                );
                return Err(AuthError::CodeAttemptsExceeded.into());
            }
            Err(err) => return Err(err.into()),
        }
        self.limiter.clear(&input.email)?;

        let mut user = self.users.find_by_email(&input.email)?;

        let redirect_to = match input.otp_type {
            OtpType::EmailConfirmation => {
                if let Some(user) = user.as_mut() {
                    user.verify_email();
                    self.users.update(user)?;
                }
                "/login?reason=email_confirmed".to_string()
            }
            OtpType::PasswordReset => {
                self.otp.grant_reset(&input.email)?;
                with_query("/update-password", &[("email", input.email.as_str())])?
            }
        };

        Ok(VerifyOtpOutput {
            profile_id: user.map(|u| u.id),
            redirect_to,
        })
    }
}

impl Action for VerifyOtpAction {
    type Input = VerifyOtpInput;
    type Output = VerifyOtpOutput;

    fn name(&self) -> &'static str {
        "verify_otp"
    }

    fn run(&self, input: VerifyOtpInput) -> ActionFuture<'_, VerifyOtpOutput> {
        Box::pin(async move { self.verify(input) })
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<VerifyOtpAction>> {
    Ok(Feature::new(schema()?, VerifyOtpAction::new(services))
        .with_general_message("Unable to verify code."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::schema::RawInput;
    use serde_json::json;

    fn raw(email: &str, otp: &str, kind: &str) -> RawInput {
        RawInput::from_json(json!({"email": email, "otp": otp, "type": kind})).unwrap()
    }

    #[tokio::test]
    async fn test_email_confirmation_marks_account_verified() {
        let services = Services::in_memory();
        let user = services
            .seed_user("ana@example.com", "Passw0rd!", Role::Client)
            .unwrap();
        let code = services
            .otp
            .issue("ana@example.com", OtpType::EmailConfirmation)
            .unwrap();

        let result = feature(&services)
            .unwrap()
            .dispatch(&raw("ana@example.com", &code, "email_confirmation"))
            .await;

        assert_eq!(result.data().unwrap().profile_id, Some(user.id));
        let stored = services.users.find_by_id(user.id).unwrap().unwrap();
        assert!(stored.email_verified);
    }

    #[tokio::test]
    async fn test_password_reset_code_grants_update() {
        let services = Services::in_memory();
        services
            .seed_user("ana@example.com", "Passw0rd!", Role::Client)
            .unwrap();
        let code = services
            .otp
            .issue("ana@example.com", OtpType::PasswordReset)
            .unwrap();

        let result = feature(&services)
            .unwrap()
            .dispatch(&raw("ana@example.com", &code, "password_reset"))
            .await;

        assert_eq!(
            result.data().unwrap().redirect_to,
            "/update-password?email=ana%40example.com"
        );
        assert!(services.otp.take_reset_grant("ana@example.com").unwrap());
    }

    #[tokio::test]
    async fn test_wrong_code_is_general_error() {
        let services = Services::in_memory();
        let result = feature(&services)
            .unwrap()
            .dispatch(&raw("ana@example.com", "123456", "password_reset"))
            .await;

        assert_eq!(result.general_error(), Some("Invalid or expired code"));
    }

    #[tokio::test]
    async fn test_code_shape_and_type_checked() {
        let result = feature(&Services::in_memory())
            .unwrap()
            .dispatch(&raw("ana@example.com", "12ab", "two_factor"))
            .await;

        let errors = result.field_errors().unwrap();
        assert_eq!(errors.get("otp").unwrap().len(), 2);
        assert_eq!(
            errors.get("type"),
            Some(
                &["Invalid option: expected one of 'email_confirmation' | 'password_reset'"
                    .to_string()][..]
            )
        );
    }

    fn wrong_code(code: &str) -> &'static str {
        if code == "000000" {
            "111111"
        } else {
            "000000"
        }
    }

    #[tokio::test]
    async fn test_correct_code_refused_after_repeated_misses() {
        let services = Services::in_memory();
        services
            .seed_user("ana@example.com", "Passw0rd!", Role::Client)
            .unwrap();
        let code = services
            .otp
            .issue("ana@example.com", OtpType::PasswordReset)
            .unwrap();
        let feature = feature(&services).unwrap();

        let miss = raw("ana@example.com", wrong_code(&code), "password_reset");
        for _ in 0..4 {
            let result = feature.dispatch(&miss).await;
            assert_eq!(result.general_error(), Some("Invalid or expired code"));
        }
        let burned = feature.dispatch(&miss).await;
        assert_eq!(
            burned.general_error(),
            Some("Too many incorrect codes. Please request a new code.")
        );

        let late = feature
            .dispatch(&raw("ana@example.com", &code, "password_reset"))
            .await;
        assert!(!late.is_success());
        assert!(!services.otp.take_reset_grant("ana@example.com").unwrap());
    }

    #[tokio::test]
    async fn test_guessing_across_reissued_codes_is_rate_limited() {
        let services = Services::in_memory();
        services
            .seed_user("ana@example.com", "Passw0rd!", Role::Client)
            .unwrap();
        let feature = feature(&services).unwrap();

        for _ in 0..5 {
            let code = services
                .otp
                .issue("ana@example.com", OtpType::PasswordReset)
                .unwrap();
            feature
                .dispatch(&raw("ana@example.com", wrong_code(&code), "password_reset"))
                .await;
        }

        let code = services
            .otp
            .issue("ana@example.com", OtpType::PasswordReset)
            .unwrap();
        let limited = feature
            .dispatch(&raw("ana@example.com", &code, "password_reset"))
            .await;
        assert!(limited
            .general_error()
            .unwrap()
            .starts_with("Too many attempts"));
    }
}
