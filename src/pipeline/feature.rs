//! Feature: a schema and an action bound together at definition time.

use super::action::Action;
use super::dispatcher::{dispatch_with, ActionResult, FailureMessages};
use crate::schema::{validate, RawInput, Schema, ValidationResult};

/// One form-driven entry point.
///
/// The schema/action pairing cannot be changed after construction, so a
/// given entry point always validates against the same shape before
/// reaching the same effect.
pub struct Feature<A: Action> {
    schema: Schema,
    action: A,
    messages: FailureMessages,
}

impl<A: Action> Feature<A> {
    /// Pair a schema with an action, using the default failure messages
    pub fn new(schema: Schema, action: A) -> Self {
        Self {
            schema,
            action,
            messages: FailureMessages::default(),
        }
    }

    /// Summary shown above field errors
    pub fn with_invalid_message(mut self, message: impl Into<String>) -> Self {
        self.messages.invalid = message.into();
        self
    }

    /// Notice shown when the action fails
    pub fn with_general_message(mut self, message: impl Into<String>) -> Self {
        self.messages.general = message.into();
        self
    }

    /// Action name
    pub fn name(&self) -> &'static str {
        self.action.name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn messages(&self) -> &FailureMessages {
        &self.messages
    }

    /// Validate without invoking the action
    pub fn validate(&self, raw: &RawInput) -> ValidationResult<A::Input> {
        validate(&self.schema, raw)
    }

    /// Validate and, if valid, invoke the action
    pub async fn dispatch(&self, raw: &RawInput) -> ActionResult<A::Output> {
        dispatch_with(&self.schema, &self.action, raw, &self.messages).await
    }
}
