//! Validation outcome shapes

use serde::Serialize;
use std::collections::BTreeMap;

/// Field-addressable error report.
///
/// `field_errors` holds every message for every failing field, keyed by
/// field name. `form_errors` holds messages that belong to no single field.
/// Keys are ordered so identical input always produces identical reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    form_errors: Vec<String>,
    field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report with a single form-level message
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_form_error(message);
        errors
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Record several messages against a field
    pub fn extend(&mut self, field: impl Into<String>, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        self.field_errors
            .entry(field.into())
            .or_default()
            .extend(messages);
    }

    /// Record a message that belongs to no single field
    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Messages for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.field_errors.get(field).map(Vec::as_slice)
    }

    /// Whether a field has at least one message
    pub fn has(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    /// Names of failing fields, sorted
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.field_errors.keys().map(String::as_str)
    }

    pub fn form_errors(&self) -> &[String] {
        &self.form_errors
    }

    pub fn field_errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.field_errors
    }
}

/// Result of validating raw input against a schema.
///
/// `Valid` is produced only when every field satisfied its rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult<T> {
    Valid { value: T },
    Invalid { errors: FieldErrors },
}

impl<T> ValidationResult<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    /// Typed value, when valid
    pub fn value(&self) -> Option<&T> {
        match self {
            ValidationResult::Valid { value } => Some(value),
            ValidationResult::Invalid { .. } => None,
        }
    }

    /// Error report, when invalid
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Valid { .. } => None,
            ValidationResult::Invalid { errors } => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            ValidationResult::Valid { value } => Ok(value),
            ValidationResult::Invalid { errors } => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is required");
        errors.add("email", "Please enter a valid email address");
        errors.extend("password", vec!["Required".to_string()]);
        errors.extend("ignored", Vec::new());

        assert_eq!(errors.get("email").unwrap().len(), 2);
        assert!(errors.has("password"));
        assert!(!errors.has("ignored"));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "password"]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut errors = FieldErrors::new();
        errors.add("type", "Invalid option");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["formErrors"], serde_json::json!([]));
        assert_eq!(json["fieldErrors"]["type"][0], "Invalid option");
    }

    #[test]
    fn test_validation_result_accessors() {
        let valid: ValidationResult<u8> = ValidationResult::Valid { value: 3 };
        assert!(valid.is_valid());
        assert_eq!(valid.value(), Some(&3));
        assert!(valid.errors().is_none());

        let invalid: ValidationResult<u8> = ValidationResult::Invalid {
            errors: FieldErrors::form("Invalid input"),
        };
        assert!(!invalid.is_valid());
        assert_eq!(invalid.into_result().unwrap_err().form_errors().len(), 1);
    }
}
