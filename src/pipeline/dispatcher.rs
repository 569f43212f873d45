//! Action dispatcher
//!
//! Validate, then invoke. Enforces:
//! - The action never runs on invalid input
//! - The action runs exactly once on valid input
//! - Nothing but an [`ActionResult`] leaves the dispatch boundary

use serde::Serialize;

use super::action::Action;
use crate::observability::{Event, Logger, Severity};
use crate::schema::{validate, FieldErrors, RawInput, Schema, ValidationResult};

/// Default message attached to field-error failures
pub const DEFAULT_INVALID_MESSAGE: &str = "Validation failed";

/// Default message attached to general failures
pub const DEFAULT_GENERAL_MESSAGE: &str = "Something went wrong. Please try again.";

/// Caller-facing messages for the two failure kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMessages {
    /// Summary shown above field errors
    pub invalid: String,
    /// Notice shown when the action fails
    pub general: String,
}

impl Default for FailureMessages {
    fn default() -> Self {
        Self {
            invalid: DEFAULT_INVALID_MESSAGE.to_string(),
            general: DEFAULT_GENERAL_MESSAGE.to_string(),
        }
    }
}

/// Why a dispatch did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionFailure {
    /// Validation failed; the action was not invoked
    Fields {
        message: String,
        #[serde(flatten)]
        errors: FieldErrors,
    },
    /// The action ran and failed
    General { message: String },
}

/// Outcome of a dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult<T> {
    Success { data: T },
    Failure(ActionFailure),
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }

    /// Returned data, on success
    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResult::Success { data } => Some(data),
            ActionResult::Failure(_) => None,
        }
    }

    /// Failure details, on failure
    pub fn failure(&self) -> Option<&ActionFailure> {
        match self {
            ActionResult::Success { .. } => None,
            ActionResult::Failure(failure) => Some(failure),
        }
    }

    /// Field errors, when validation failed
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ActionResult::Failure(ActionFailure::Fields { errors, .. }) => Some(errors),
            _ => None,
        }
    }

    /// General error message, when the action failed
    pub fn general_error(&self) -> Option<&str> {
        match self {
            ActionResult::Failure(ActionFailure::General { message }) => Some(message),
            _ => None,
        }
    }

    /// HTTP status code for this outcome
    pub fn status_code(&self) -> u16 {
        match self {
            ActionResult::Success { .. } => 200,
            ActionResult::Failure(ActionFailure::Fields { .. }) => 422,
            ActionResult::Failure(ActionFailure::General { .. }) => 400,
        }
    }
}

/// Validate `raw` against `schema` and, if valid, run `action`.
pub async fn dispatch<A: Action>(schema: &Schema, action: &A, raw: &RawInput) -> ActionResult<A::Output> {
    dispatch_with(schema, action, raw, &FailureMessages::default()).await
}

/// [`dispatch`] with caller-chosen failure messages.
pub async fn dispatch_with<A: Action>(
    schema: &Schema,
    action: &A,
    raw: &RawInput,
    messages: &FailureMessages,
) -> ActionResult<A::Output> {
    let input = match validate::<A::Input>(schema, raw) {
        ValidationResult::Valid { value } => value,
        ValidationResult::Invalid { errors } => {
            let fields = errors.fields().collect::<Vec<_>>().join(",");
            Logger::emit(
                Severity::Warn,
                Event::ActionRejectedInvalid,
                &[
                    ("action", action.name()),
                    ("fields", &fields),
                    ("schema", schema.name()),
                ],
            );
            return ActionResult::Failure(ActionFailure::Fields {
                message: messages.invalid.clone(),
                errors,
            });
        }
    };

    match action.run(input).await {
        Ok(data) => {
            Logger::emit(Severity::Info, Event::ActionSucceeded, &[("action", action.name())]);
            ActionResult::Success { data }
        }
        Err(err) => {
            let severity = if err.is_client_error() {
                Severity::Warn
            } else {
                Severity::Error
            };
            let cause = err.to_string();
            Logger::emit(
                severity,
                Event::ActionFailed,
                &[("action", action.name()), ("cause", &cause), ("kind", err.kind())],
            );
            ActionResult::Failure(ActionFailure::General {
                message: err.public_message(&messages.general),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ActionError, ActionFuture};
    use crate::schema::{one_of, string};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct Greeting {
        name: String,
        tone: String,
    }

    #[derive(Default)]
    struct CountingAction {
        calls: AtomicUsize,
        fail_with: Option<ActionError>,
    }

    impl Action for CountingAction {
        type Input = Greeting;
        type Output = String;

        fn name(&self) -> &'static str {
            "greet"
        }

        fn run(&self, input: Greeting) -> ActionFuture<'_, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(format!("{} {}", input.tone, input.name)),
            };
            Box::pin(async move { outcome })
        }
    }

    fn schema() -> Schema {
        Schema::builder("greeting")
            .field("name", string().min_len(1, "Name is required"))
            .field("tone", one_of(&["hello", "hey"]))
            .build()
            .unwrap()
    }

    fn raw(value: serde_json::Value) -> RawInput {
        RawInput::from_json(value).unwrap()
    }

    #[tokio::test]
    async fn test_valid_input_runs_action_once() {
        let action = CountingAction::default();
        let result = dispatch(&schema(), &action, &raw(json!({"name": "Ana", "tone": "hey"}))).await;

        assert_eq!(result.data(), Some(&"hey Ana".to_string()));
        assert_eq!(action.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.status_code(), 200);
    }

    #[tokio::test]
    async fn test_invalid_input_never_runs_action() {
        let action = CountingAction::default();
        let result = dispatch(&schema(), &action, &raw(json!({"name": "", "tone": "yo"}))).await;

        assert_eq!(action.calls.load(Ordering::SeqCst), 0);
        let errors = result.field_errors().unwrap();
        assert!(errors.has("name"));
        assert!(errors.has("tone"));
        assert_eq!(result.status_code(), 422);
    }

    #[tokio::test]
    async fn test_action_failure_becomes_general_error() {
        let action = CountingAction {
            fail_with: Some(ActionError::Unavailable("smtp timeout".into())),
            ..Default::default()
        };
        let messages = FailureMessages {
            invalid: "Check the form".into(),
            general: "Could not send greeting".into(),
        };
        let result = dispatch_with(
            &schema(),
            &action,
            &raw(json!({"name": "Ana", "tone": "hello"})),
            &messages,
        )
        .await;

        assert_eq!(action.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.general_error(), Some("Could not send greeting"));
        assert!(result.field_errors().is_none());
        assert_eq!(result.status_code(), 400);
    }

    #[test]
    fn test_serialized_shapes() {
        let success: ActionResult<u8> = ActionResult::Success { data: 7 };
        assert_eq!(
            serde_json::to_value(&success).unwrap(),
            json!({"status": "success", "data": 7})
        );

        let mut errors = FieldErrors::new();
        errors.add("email", "Required");
        let fields: ActionResult<u8> = ActionResult::Failure(ActionFailure::Fields {
            message: "Validation failed".into(),
            errors,
        });
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({
                "status": "failure",
                "kind": "fields",
                "message": "Validation failed",
                "formErrors": [],
                "fieldErrors": {"email": ["Required"]}
            })
        );

        let general: ActionResult<u8> = ActionResult::Failure(ActionFailure::General {
            message: "Failed to update settings.".into(),
        });
        assert_eq!(
            serde_json::to_value(&general).unwrap(),
            json!({"status": "failure", "kind": "general", "message": "Failed to update settings."})
        );
    }
}
