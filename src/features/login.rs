//! Sign in with email and password.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, RateLimiter, SessionManager, UserRepository};
use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{Action, ActionError, ActionFuture, Feature};
use crate::schema::{boolean, string, Schema, SchemaResult};
use crate::services::Services;

/// Shown for unknown accounts and wrong passwords alike
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("login")
        .field(
            "email",
            string()
                .min_len(1, "Email is required")
                .email("Please enter a valid email address"),
        )
        .field("password", string().min_len(1, "Password is required"))
        .field("remember", boolean().optional())
        .build()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub remember: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    /// Dashboard for the account's role
    pub redirect_to: String,
    /// Raw session token for the client cookie
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct LoginAction {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionManager>,
    limiter: Arc<RateLimiter>,
}

impl LoginAction {
    pub fn new(services: &Services) -> Self {
        Self {
            users: services.users.clone(),
            sessions: services.sessions.clone(),
            limiter: services.login_limiter.clone(),
        }
    }

    fn sign_in(&self, input: LoginInput) -> Result<LoginOutput, ActionError> {
        if let Err(err) = self.limiter.check(&input.email) {
            if let AuthError::TooManyAttempts { retry_after_secs } = &err {
                let retry = retry_after_secs.to_string();
                Logger::emit(
                    Severity::Warn,
                    Event::LoginRateLimited,
                    &[("retry_after_secs", &retry)],
                );
            }
            return Err(err.into());
        }

        let user = self
            .users
            .find_by_email(&input.email)?
            .ok_or_else(|| ActionError::rejected(INVALID_CREDENTIALS_MESSAGE))?;

        match user.verify_password(&input.password) {
            Ok(true) => {}
            Ok(false) | Err(AuthError::InvalidCredentials) => {
                return Err(ActionError::rejected(INVALID_CREDENTIALS_MESSAGE))
            }
            Err(other) => return Err(other.into()),
        }

        self.limiter.clear(&input.email)?;

        let (session, token) = self
            .sessions
            .create_session(user.id, input.remember.unwrap_or(false))?;

        Ok(LoginOutput {
            redirect_to: user.role.dashboard_route().to_string(),
            session_token: token,
            expires_at: session.expires_at,
        })
    }
}

impl Action for LoginAction {
    type Input = LoginInput;
    type Output = LoginOutput;

    fn name(&self) -> &'static str {
        "login"
    }

    fn run(&self, input: LoginInput) -> ActionFuture<'_, LoginOutput> {
        Box::pin(async move { self.sign_in(input) })
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<LoginAction>> {
    Ok(Feature::new(schema()?, LoginAction::new(services))
        .with_general_message("Unable to sign in right now. Please try again."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::schema::RawInput;
    use chrono::Duration;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawInput {
        RawInput::from_json(value).unwrap()
    }

    fn services_with_accounts() -> Services {
        let services = Services::in_memory();
        services
            .seed_user("admin@example.com", "Adm1nPass", Role::Admin)
            .unwrap();
        services
            .seed_user("ana@example.com", "Passw0rd!", Role::Client)
            .unwrap();
        services
    }

    #[tokio::test]
    async fn test_empty_email_reports_email_and_password() {
        let feature = feature(&Services::in_memory()).unwrap();
        let result = feature.dispatch(&raw(json!({"email": ""}))).await;

        let errors = result.field_errors().unwrap();
        assert!(errors.has("email"));
        assert_eq!(errors.get("password"), Some(&["Required".to_string()][..]));
    }

    #[tokio::test]
    async fn test_redirect_follows_role() {
        let services = services_with_accounts();
        let feature = feature(&services).unwrap();

        let admin = feature
            .dispatch(&raw(json!({"email": "admin@example.com", "password": "Adm1nPass"})))
            .await;
        assert_eq!(admin.data().unwrap().redirect_to, "/admin/dashboard");

        let client = feature
            .dispatch(&raw(json!({"email": "ana@example.com", "password": "Passw0rd!"})))
            .await;
        let data = client.data().unwrap();
        assert_eq!(data.redirect_to, "/client/dashboard");
        assert!(services.sessions.validate(&data.session_token).is_ok());
    }

    #[tokio::test]
    async fn test_remember_extends_session() {
        let services = services_with_accounts();
        let feature = feature(&services).unwrap();

        let result = feature
            .dispatch(&RawInput::from_pairs([
                ("email", "ana@example.com"),
                ("password", "Passw0rd!"),
                ("remember", "on"),
            ]))
            .await;

        let expires_at = result.data().unwrap().expires_at;
        assert!(expires_at > Utc::now() + Duration::days(29));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_account_look_identical() {
        let services = services_with_accounts();
        let feature = feature(&services).unwrap();

        let wrong = feature
            .dispatch(&raw(json!({"email": "ana@example.com", "password": "nope"})))
            .await;
        let unknown = feature
            .dispatch(&raw(json!({"email": "who@example.com", "password": "nope"})))
            .await;

        assert_eq!(wrong.general_error(), Some(INVALID_CREDENTIALS_MESSAGE));
        assert_eq!(unknown.general_error(), Some(INVALID_CREDENTIALS_MESSAGE));
    }

    #[tokio::test]
    async fn test_sixth_attempt_is_rate_limited() {
        let services = services_with_accounts();
        let feature = feature(&services).unwrap();
        let bad = raw(json!({"email": "ana@example.com", "password": "nope"}));

        for _ in 0..5 {
            let result = feature.dispatch(&bad).await;
            assert_eq!(result.general_error(), Some(INVALID_CREDENTIALS_MESSAGE));
        }

        let limited = feature
            .dispatch(&raw(json!({"email": "ana@example.com", "password": "Passw0rd!"})))
            .await;
        assert!(limited
            .general_error()
            .unwrap()
            .starts_with("Too many attempts"));
    }

    #[tokio::test]
    async fn test_success_clears_attempts() {
        let services = services_with_accounts();
        let feature = feature(&services).unwrap();
        let bad = raw(json!({"email": "ana@example.com", "password": "nope"}));
        let good = raw(json!({"email": "ana@example.com", "password": "Passw0rd!"}));

        for _ in 0..4 {
            feature.dispatch(&bad).await;
        }
        assert!(feature.dispatch(&good).await.is_success());

        for _ in 0..4 {
            feature.dispatch(&bad).await;
        }
        assert!(feature.dispatch(&good).await.is_success());
    }
}
