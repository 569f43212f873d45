//! Marketing-site contact form.
//!
//! Submissions are limited per sender address (3 an hour by default) and
//! recorded as a structured log line for the team to follow up.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::vocab::ServiceInterest;
use crate::auth::{AuthError, RateLimiter};
use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{Action, ActionError, ActionFuture, ActionOutcome, Feature};
use crate::schema::{one_of, string, Schema, SchemaResult};
use crate::services::Services;

pub const THANK_YOU_MESSAGE: &str = "Thank you! We will be in touch soon.";

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("contact")
        .field(
            "fullName",
            string()
                .trim()
                .min_len(2, "Name must be at least 2 characters")
                .max_len(100, "Name must be less than 100 characters"),
        )
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
                .max_len(100, "Company name must be less than 100 characters")
                .optional()
                .empty_as_absent(),
        )
        .field(
            "phone",
            string()
                .trim()
                .max_len(30, "Phone number is too long")
                .optional()
                .empty_as_absent(),
        )
        .field(
            "serviceInterest",
            one_of(ServiceInterest::ALL).message("Please select a service"),
        )
        .field(
            "message",
            string()
                .trim()
                .min_len(10, "Message must be at least 10 characters")
                .max_len(5000, "Message must be less than 5000 characters"),
        )
        .build()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub full_name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub service_interest: ServiceInterest,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactOutput {
    pub message: String,
}

pub struct SubmitContactAction {
    limiter: Arc<RateLimiter>,
}

impl SubmitContactAction {
    pub fn new(services: &Services) -> Self {
        Self {
            limiter: services.contact_limiter.clone(),
        }
    }

    fn submit(&self, input: ContactInput) -> ActionOutcome<ContactOutput> {
        match self.limiter.check(&input.email) {
            Ok(()) => {}
            Err(AuthError::TooManyAttempts { retry_after_secs }) => {
                let retry = retry_after_secs.to_string();
                Logger::emit(
                    Severity::Warn,
                    Event::ContactRateLimited,
                    &[("retry_after_secs", &retry)],
                );
                let minutes = retry_after_secs.div_ceil(60);
                return Err(ActionError::rejected(format!(
                    "Too many submissions. Please try again in {} minute(s).",
                    minutes
                )));
            }
            Err(other) => return Err(other.into()),
        }

        let message_chars = input.message.chars().count().to_string();
        Logger::emit(
            Severity::Info,
            Event::ContactSubmitted,
            &[
                ("name", &input.full_name),
                ("email", &input.email),
                ("company", input.company_name.as_deref().unwrap_or("")),
                ("phone", input.phone.as_deref().unwrap_or("")),
                ("service", input.service_interest.as_str()),
                ("message_chars", &message_chars),
            ],
        );

        Ok(ContactOutput {
            message: THANK_YOU_MESSAGE.to_string(),
        })
    }
}

impl Action for SubmitContactAction {
    type Input = ContactInput;
    type Output = ContactOutput;

    fn name(&self) -> &'static str {
        "submit_contact_form"
    }

    fn run(&self, input: ContactInput) -> ActionFuture<'_, ContactOutput> {
        Box::pin(async move { self.submit(input) })
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<SubmitContactAction>> {
    Ok(Feature::new(schema()?, SubmitContactAction::new(services))
        .with_invalid_message("Please fix the errors below")
        .with_general_message("Unable to send your message. Please try again."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ActionFailure;
    use crate::schema::RawInput;

    fn form(email: &str) -> RawInput {
        RawInput::from_pairs([
            ("fullName", "Ana Lima"),
            ("email", email),
            ("companyName", ""),
            ("phone", ""),
            ("serviceInterest", "website_build"),
            ("message", "We need a new site for our bakery."),
        ])
    }

    #[tokio::test]
    async fn test_blank_optional_fields_are_absent() {
        let result = feature(&Services::in_memory())
            .unwrap()
            .dispatch(&form("ana@example.com"))
            .await;
        assert_eq!(result.data().unwrap().message, THANK_YOU_MESSAGE);
    }

    #[tokio::test]
    async fn test_fourth_submission_in_an_hour_refused() {
        let feature = feature(&Services::in_memory()).unwrap();

        for _ in 0..3 {
            assert!(feature.dispatch(&form("ana@example.com")).await.is_success());
        }
        let refused = feature.dispatch(&form("ana@example.com")).await;
        assert_eq!(
            refused.general_error(),
            Some("Too many submissions. Please try again in 60 minute(s).")
        );

        assert!(feature.dispatch(&form("bob@example.com")).await.is_success());
    }

    #[tokio::test]
    async fn test_invalid_form_reports_every_field() {
        let result = feature(&Services::in_memory())
            .unwrap()
            .dispatch(&RawInput::from_pairs([
                ("fullName", " A "),
                ("email", "nope"),
                ("serviceInterest", "seo"),
                ("message", "hi"),
            ]))
            .await;

        let errors = result.field_errors().unwrap();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["email", "fullName", "message", "serviceInterest"]);
        assert_eq!(
            errors.get("serviceInterest"),
            Some(&["Please select a service".to_string()][..])
        );
        assert!(matches!(
            result.failure(),
            Some(ActionFailure::Fields { message, .. }) if message == "Please fix the errors below"
        ));
    }
}
