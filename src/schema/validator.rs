//! Schema validator for submitted input
//!
//! Validation semantics:
//! - Every declared field is checked; all failures are reported in one pass
//! - Undeclared fields are ignored
//! - `null` and (for `empty_as_absent` fields) `""` count as absence
//! - `trim` fields are trimmed before absence and every check
//! - Absent optional fields validate as `null`
//! - Booleans and integers are coerced from their form-string spellings
//! - Refinements run only when every field passed
//!
//! Validation is total and deterministic. It never panics and never
//! mutates its input.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use regex::Regex;

use super::input::RawInput;
use super::report::{FieldErrors, ValidationResult};
use super::types::{CharClass, FieldDef, Format, Refinement, Rule, Schema, StringCheck};
use crate::observability::{Event, Logger};

/// Message used when no field-specific message is configured
const REQUIRED_MESSAGE: &str = "Required";

/// Form-level message when validated data cannot be shaped into the typed input
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input";

/// Validates raw input and shapes it into the typed input `T`.
///
/// Field names in the validated object match the schema's field names, so
/// `T` is usually a `#[serde(rename_all = "camelCase")]` struct mirroring
/// the schema. A mismatch between `T` and the schema is a programming
/// error; it is logged and reported as a form-level error.
pub fn validate<T: DeserializeOwned>(schema: &Schema, raw: &RawInput) -> ValidationResult<T> {
    let fields = match schema.check(raw) {
        Ok(fields) => fields,
        Err(errors) => return ValidationResult::Invalid { errors },
    };

    match serde_json::from_value(Value::Object(fields)) {
        Ok(value) => ValidationResult::Valid { value },
        Err(e) => {
            let error = e.to_string();
            Logger::error(
                Event::TypedInputMismatch.as_str(),
                &[("error", &error), ("schema", schema.name())],
            );
            ValidationResult::Invalid {
                errors: FieldErrors::form(INVALID_INPUT_MESSAGE),
            }
        }
    }
}

impl Schema {
    /// Validates raw input, returning the coerced field values.
    ///
    /// The returned object contains every declared field; absent optional
    /// fields are `null`.
    pub fn check(&self, raw: &RawInput) -> Result<Map<String, Value>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut output = Map::new();

        for entry in self.fields() {
            match check_field(&entry.def, raw.get(&entry.name)) {
                Ok(value) => {
                    output.insert(entry.name.clone(), value);
                }
                Err(messages) => errors.extend(entry.name.clone(), messages),
            }
        }

        if errors.is_empty() {
            for refinement in self.refinements() {
                apply_refinement(refinement, &output, &mut errors);
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }
}

fn apply_refinement(refinement: &Refinement, output: &Map<String, Value>, errors: &mut FieldErrors) {
    match refinement {
        Refinement::FieldsMatch {
            field,
            other,
            message,
        } => {
            if output.get(field) != output.get(other) {
                errors.add(field.clone(), message.clone());
            }
        }
    }
}

/// Checks a single field, returning the coerced value or every failure message.
fn check_field(def: &FieldDef, raw: Option<&Value>) -> Result<Value, Vec<String>> {
    let present = match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if def.empty_as_absent && normalize(def, s).is_empty() => None,
        Some(value) => Some(value),
    };

    let Some(value) = present else {
        return if def.optional {
            Ok(Value::Null)
        } else {
            Err(vec![override_or(def, REQUIRED_MESSAGE.to_string())])
        };
    };

    match &def.rule {
        Rule::String { checks } => {
            let Value::String(s) = value else {
                return Err(vec![type_message(def, value)]);
            };
            let s = normalize(def, s);
            let failures: Vec<String> = checks
                .iter()
                .filter(|check| !string_check_passes(check, s))
                .map(|check| check.message().to_string())
                .collect();
            if failures.is_empty() {
                Ok(Value::String(s.to_string()))
            } else {
                Err(failures)
            }
        }
        Rule::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => parse_form_bool(s)
                .map(Value::Bool)
                .ok_or_else(|| vec![type_message(def, value)]),
            _ => Err(vec![type_message(def, value)]),
        },
        Rule::Integer { min, max } => {
            let n = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| vec![type_message(def, value)])?;

            if let Some(min) = min {
                if n < *min {
                    return Err(vec![format!("Must be at least {}", min)]);
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return Err(vec![format!("Must be at most {}", max)]);
                }
            }
            Ok(Value::from(n))
        }
        Rule::Enum { allowed } => match value {
            Value::String(s) if allowed.iter().any(|a| a == s) => Ok(Value::String(s.clone())),
            _ => {
                let expected = allowed
                    .iter()
                    .map(|a| format!("'{}'", a))
                    .collect::<Vec<_>>()
                    .join(" | ");
                Err(vec![override_or(
                    def,
                    format!("Invalid option: expected one of {}", expected),
                )])
            }
        },
    }
}

fn normalize<'a>(def: &FieldDef, s: &'a str) -> &'a str {
    if def.trim {
        s.trim()
    } else {
        s
    }
}

fn override_or(def: &FieldDef, default: String) -> String {
    def.message.clone().unwrap_or(default)
}

fn type_message(def: &FieldDef, actual: &Value) -> String {
    override_or(
        def,
        format!(
            "Expected {}, received {}",
            def.rule.kind_name(),
            json_type_name(actual)
        ),
    )
}

/// Checkbox and toggle spellings accepted for boolean fields
fn parse_form_bool(s: &str) -> Option<bool> {
    match s {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn string_check_passes(check: &StringCheck, s: &str) -> bool {
    match check {
        StringCheck::MinLength { len, .. } => s.chars().count() >= *len,
        StringCheck::MaxLength { len, .. } => s.chars().count() <= *len,
        StringCheck::Format { format, .. } => format_matches(*format, s),
        StringCheck::Contains { class, .. } => match class {
            CharClass::Lowercase => s.chars().any(|c| c.is_lowercase()),
            CharClass::Uppercase => s.chars().any(|c| c.is_uppercase()),
            CharClass::Digit => s.chars().any(|c| c.is_ascii_digit()),
        },
    }
}

fn format_matches(format: Format, s: &str) -> bool {
    match format {
        Format::Email => email_pattern().is_match(s),
        Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        Format::Url => url_pattern().is_match(s),
        Format::Digits => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
        Format::DateTime => is_utc_timestamp(s),
    }
}

/// RFC 3339 in UTC: `T` separator and a `Z` suffix, no numeric offset
fn is_utc_timestamp(s: &str) -> bool {
    s.as_bytes().get(10) == Some(&b'T')
        && s.ends_with('Z')
        && chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+[^\s]*$").expect("url pattern compiles")
    })
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
