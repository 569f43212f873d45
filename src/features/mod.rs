//! # Portal features
//!
//! Each module pairs one form's schema with the action it gates. The
//! [`Features`] registry builds all of them once at startup; a schema
//! definition error there is fatal.

pub mod billing;
pub mod contact;
pub mod login;
pub mod notifications;
pub mod reset_password;
pub mod settings;
pub mod signup;
pub mod support;
pub mod update_password;
pub mod verify_otp;
pub mod vocab;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{ActionError, ActionOutcome, ActionResult, Feature};
use crate::schema::{RawInput, Schema, SchemaResult};
use crate::services::Services;

/// Feature entry points, as addressed over HTTP and from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum FeatureName {
    Signup,
    Login,
    ResetPassword,
    VerifyOtp,
    UpdatePassword,
    Billing,
    Settings,
    Support,
    Notifications,
    Contact,
}

impl FeatureName {
    pub const ALL: [FeatureName; 10] = [
        FeatureName::Signup,
        FeatureName::Login,
        FeatureName::ResetPassword,
        FeatureName::VerifyOtp,
        FeatureName::UpdatePassword,
        FeatureName::Billing,
        FeatureName::Settings,
        FeatureName::Support,
        FeatureName::Notifications,
        FeatureName::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::Signup => "signup",
            FeatureName::Login => "login",
            FeatureName::ResetPassword => "reset_password",
            FeatureName::VerifyOtp => "verify_otp",
            FeatureName::UpdatePassword => "update_password",
            FeatureName::Billing => "billing",
            FeatureName::Settings => "settings",
            FeatureName::Support => "support",
            FeatureName::Notifications => "notifications",
            FeatureName::Contact => "contact",
        }
    }

    /// Reverse of [`FeatureName::as_str`]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every feature, built against one set of services
pub struct Features {
    pub signup: Feature<signup::SignupAction>,
    pub login: Feature<login::LoginAction>,
    pub reset_password: Feature<reset_password::ResetPasswordAction>,
    pub verify_otp: Feature<verify_otp::VerifyOtpAction>,
    pub update_password: Feature<update_password::UpdatePasswordAction>,
    pub billing: Feature<billing::SavePaymentMethodAction>,
    pub settings: Feature<settings::UpdateSettingsAction>,
    pub support: Feature<support::CreateTicketAction>,
    pub notifications: Feature<notifications::CreateNotificationAction>,
    pub contact: Feature<contact::SubmitContactAction>,
}

impl Features {
    pub fn new(services: &Services) -> SchemaResult<Self> {
        Ok(Self {
            signup: signup::feature(services)?,
            login: login::feature(services)?,
            reset_password: reset_password::feature(services)?,
            verify_otp: verify_otp::feature(services)?,
            update_password: update_password::feature(services)?,
            billing: billing::feature(services)?,
            settings: settings::feature(services)?,
            support: support::feature(services)?,
            notifications: notifications::feature(services)?,
            contact: contact::feature(services)?,
        })
    }

    pub fn schema(&self, name: FeatureName) -> &Schema {
        match name {
            FeatureName::Signup => self.signup.schema(),
            FeatureName::Login => self.login.schema(),
            FeatureName::ResetPassword => self.reset_password.schema(),
            FeatureName::VerifyOtp => self.verify_otp.schema(),
            FeatureName::UpdatePassword => self.update_password.schema(),
            FeatureName::Billing => self.billing.schema(),
            FeatureName::Settings => self.settings.schema(),
            FeatureName::Support => self.support.schema(),
            FeatureName::Notifications => self.notifications.schema(),
            FeatureName::Contact => self.contact.schema(),
        }
    }

    /// Validate only. The action is never invoked.
    pub fn check(&self, name: FeatureName, raw: &RawInput) -> Value {
        match self.schema(name).check(raw) {
            Ok(fields) => json!({ "valid": true, "fields": fields }),
            Err(errors) => json!({ "valid": false, "errors": errors }),
        }
    }

    /// Dispatch and render the outcome as `(status, body)`
    pub async fn dispatch_json(&self, name: FeatureName, raw: &RawInput) -> (u16, Value) {
        match name {
            FeatureName::Signup => render(self.signup.dispatch(raw).await),
            FeatureName::Login => render(self.login.dispatch(raw).await),
            FeatureName::ResetPassword => render(self.reset_password.dispatch(raw).await),
            FeatureName::VerifyOtp => render(self.verify_otp.dispatch(raw).await),
            FeatureName::UpdatePassword => render(self.update_password.dispatch(raw).await),
            FeatureName::Billing => render(self.billing.dispatch(raw).await),
            FeatureName::Settings => render(self.settings.dispatch(raw).await),
            FeatureName::Support => render(self.support.dispatch(raw).await),
            FeatureName::Notifications => render(self.notifications.dispatch(raw).await),
            FeatureName::Contact => render(self.contact.dispatch(raw).await),
        }
    }
}

fn render<T: Serialize>(result: ActionResult<T>) -> (u16, Value) {
    let status = result.status_code();
    match serde_json::to_value(&result) {
        Ok(body) => (status, body),
        Err(e) => {
            let error = e.to_string();
            Logger::emit(Severity::Error, Event::ResultEncodeFailed, &[("error", &error)]);
            (
                500,
                json!({ "status": "failure", "kind": "general", "message": "Internal error" }),
            )
        }
    }
}

/// `path?k=v&..` with form-urlencoded values
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> ActionOutcome<String> {
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| ActionError::Internal(format!("query encoding failed: {}", e)))?;
    Ok(format!("{}?{}", path, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    #[test]
    fn test_with_query_encodes_values() {
        assert_eq!(
            with_query("/verify-otp", &[("email", "ana@example.com"), ("type", "password_reset")])
                .unwrap(),
            "/verify-otp?email=ana%40example.com&type=password_reset"
        );
        assert_eq!(
            with_query("/x", &[("q", "a b+c&d=ü")]).unwrap(),
            "/x?q=a+b%2Bc%26d%3D%C3%BC"
        );
    }

    #[test]
    fn test_feature_names_round_trip() {
        for name in FeatureName::ALL {
            assert_eq!(FeatureName::parse(name.as_str()), Some(name));
        }
        assert_eq!(FeatureName::parse("admin"), None);
    }

    #[test]
    fn test_all_schemas_build() {
        let features = Features::new(&Services::in_memory()).unwrap();
        for name in FeatureName::ALL {
            assert!(!features.schema(name).fields().is_empty());
        }
    }

    #[tokio::test]
    async fn test_check_never_runs_action() {
        let services = Services::in_memory();
        services
            .seed_user("ana@example.com", "Passw0rd!", Role::Client)
            .unwrap();
        let features = Features::new(&services).unwrap();

        let raw = RawInput::from_pairs([("email", "ana@example.com"), ("password", "nope")]);
        let report = features.check(FeatureName::Login, &raw);
        assert_eq!(report["valid"], true);
        assert_eq!(report["fields"]["remember"], Value::Null);

        // A checked wrong password is not a failed attempt.
        for _ in 0..10 {
            features.check(FeatureName::Login, &raw);
        }
        assert!(services.login_limiter.check("ana@example.com").is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_json_status_codes() {
        let features = Features::new(&Services::in_memory()).unwrap();

        let (status, body) = features
            .dispatch_json(FeatureName::Support, &RawInput::new())
            .await;
        assert_eq!(status, 422);
        assert_eq!(body["status"], "failure");
        assert_eq!(body["kind"], "fields");
        assert!(body["fieldErrors"]["subject"].is_array());

        let (status, body) = features
            .dispatch_json(
                FeatureName::Login,
                &RawInput::from_pairs([("email", "who@example.com"), ("password", "x")]),
            )
            .await;
        assert_eq!(status, 400);
        assert_eq!(body["kind"], "general");

        let (status, body) = features
            .dispatch_json(FeatureName::Settings, &RawInput::new())
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["siteName"], "Client Portal");
    }
}
