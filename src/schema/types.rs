//! Schema type definitions
//!
//! Supported rule kinds:
//! - string: UTF-8 string with length, format and character-class checks
//! - bool: boolean, coerced from checkbox-style form strings
//! - integer: 64-bit signed integer with optional bounds
//! - enum: one value drawn from a fixed, case-sensitive set
//!
//! Schemas are flat: a schema is an ordered list of named fields. There is
//! no nesting because no form needs it.

use serde::Serialize;
use std::collections::HashSet;

use super::errors::{SchemaError, SchemaResult};

/// Recognised string formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// `local@domain.tld`
    Email,
    /// Hyphenated or simple UUID
    Uuid,
    /// Absolute URL with a scheme and host
    Url,
    /// ASCII digits only
    Digits,
    /// RFC 3339 timestamp
    DateTime,
}

/// Character classes a string may be required to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Digit,
}

/// A single check applied to a string value.
///
/// Every check on a field runs; each failing check contributes its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum StringCheck {
    MinLength { len: usize, message: String },
    MaxLength { len: usize, message: String },
    Format { format: Format, message: String },
    Contains { class: CharClass, message: String },
}

impl StringCheck {
    /// Message reported when this check fails
    pub fn message(&self) -> &str {
        match self {
            StringCheck::MinLength { message, .. }
            | StringCheck::MaxLength { message, .. }
            | StringCheck::Format { message, .. }
            | StringCheck::Contains { message, .. } => message,
        }
    }
}

/// Rule kinds, one variant per primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    String {
        checks: Vec<StringCheck>,
    },
    Bool,
    Integer {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Enum {
        allowed: Vec<String>,
    },
}

impl Rule {
    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Rule::String { .. } => "string",
            Rule::Bool => "boolean",
            Rule::Integer { .. } => "integer",
            Rule::Enum { .. } => "string",
        }
    }
}

/// Field definition: a rule plus presence modifiers.
///
/// Built through [`string`], [`boolean`], [`integer`] and [`one_of`], then
/// refined with chained modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    /// Rule the value must satisfy
    pub rule: Rule,
    /// Absence is allowed
    pub optional: bool,
    /// An empty string counts as absence
    pub empty_as_absent: bool,
    /// Surrounding whitespace is removed before any check runs
    pub trim: bool,
    /// Overrides the required, type and enum messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    misuse: Vec<String>,
}

/// Create a string field
pub fn string() -> FieldDef {
    FieldDef::new(Rule::String { checks: Vec::new() })
}

/// Create a boolean field
pub fn boolean() -> FieldDef {
    FieldDef::new(Rule::Bool)
}

/// Create an integer field
pub fn integer() -> FieldDef {
    FieldDef::new(Rule::Integer {
        min: None,
        max: None,
    })
}

/// Create an enumerated field from a fixed vocabulary
pub fn one_of(allowed: &[&str]) -> FieldDef {
    FieldDef::new(Rule::Enum {
        allowed: allowed.iter().map(|v| v.to_string()).collect(),
    })
}

impl FieldDef {
    fn new(rule: Rule) -> Self {
        Self {
            rule,
            optional: false,
            empty_as_absent: false,
            trim: false,
            message: None,
            misuse: Vec::new(),
        }
    }

    fn push_check(mut self, modifier: &str, check: StringCheck) -> Self {
        match &mut self.rule {
            Rule::String { checks } => checks.push(check),
            other => {
                let reason = format!("'{}' applies to strings, not {}", modifier, other.kind_name());
                self.misuse.push(reason);
            }
        }
        self
    }

    /// Require at least `len` characters
    pub fn min_len(self, len: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        self.push_check("min_len", StringCheck::MinLength { len, message })
    }

    /// Allow at most `len` characters
    pub fn max_len(self, len: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        self.push_check("max_len", StringCheck::MaxLength { len, message })
    }

    /// Require an email address
    pub fn email(self, message: impl Into<String>) -> Self {
        self.format(Format::Email, message)
    }

    /// Require a UUID
    pub fn uuid(self, message: impl Into<String>) -> Self {
        self.format(Format::Uuid, message)
    }

    /// Require an absolute URL
    pub fn url(self, message: impl Into<String>) -> Self {
        self.format(Format::Url, message)
    }

    /// Require ASCII digits only
    pub fn digits(self, message: impl Into<String>) -> Self {
        self.format(Format::Digits, message)
    }

    /// Require an RFC 3339 timestamp
    pub fn datetime(self, message: impl Into<String>) -> Self {
        self.format(Format::DateTime, message)
    }

    /// Require a specific format
    pub fn format(self, format: Format, message: impl Into<String>) -> Self {
        let message = message.into();
        self.push_check("format", StringCheck::Format { format, message })
    }

    /// Require at least one character of the given class
    pub fn contains(self, class: CharClass, message: impl Into<String>) -> Self {
        let message = message.into();
        self.push_check("contains", StringCheck::Contains { class, message })
    }

    /// Lower bound for an integer field (inclusive)
    pub fn at_least(mut self, bound: i64) -> Self {
        match &mut self.rule {
            Rule::Integer { min, .. } => *min = Some(bound),
            other => {
                let reason = format!("'at_least' applies to integers, not {}", other.kind_name());
                self.misuse.push(reason);
            }
        }
        self
    }

    /// Upper bound for an integer field (inclusive)
    pub fn at_most(mut self, bound: i64) -> Self {
        match &mut self.rule {
            Rule::Integer { max, .. } => *max = Some(bound),
            other => {
                let reason = format!("'at_most' applies to integers, not {}", other.kind_name());
                self.misuse.push(reason);
            }
        }
        self
    }

    /// Allow the field to be absent
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Treat an empty string as if the field had not been submitted
    pub fn empty_as_absent(mut self) -> Self {
        self.empty_as_absent = true;
        self
    }

    /// Strip surrounding whitespace; checks and the validated value see
    /// the trimmed string
    pub fn trim(mut self) -> Self {
        match &self.rule {
            Rule::String { .. } => self.trim = true,
            other => {
                let reason = format!("'trim' applies to strings, not {}", other.kind_name());
                self.misuse.push(reason);
            }
        }
        self
    }

    /// Override the required, type and enum messages
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Cross-field constraint, evaluated only once every field has passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "refinement", rename_all = "snake_case")]
pub enum Refinement {
    /// `field` must equal `other`; the error is reported on `field`
    FieldsMatch {
        field: String,
        other: String,
        message: String,
    },
}

/// A named field inside a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(flatten)]
    pub def: FieldDef,
}

/// Complete schema definition.
///
/// Pure data: validating against it has no side effects and it can be
/// shared freely between concurrent dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    name: String,
    fields: Vec<FieldEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    refinements: Vec<Refinement>,
}

impl Schema {
    /// Start building a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            refinements: Vec::new(),
        }
    }

    /// Schema name, used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Look up a field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.def)
    }

    /// Cross-field refinements
    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }
}

/// Builder for [`Schema`]; `build` performs all definition-time checks.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldEntry>,
    refinements: Vec<Refinement>,
}

impl SchemaBuilder {
    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.push(FieldEntry {
            name: name.into(),
            def,
        });
        self
    }

    /// Require `field` to equal `other`
    pub fn refine_match(
        mut self,
        field: impl Into<String>,
        other: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.refinements.push(Refinement::FieldsMatch {
            field: field.into(),
            other: other.into(),
            message: message.into(),
        });
        self
    }

    /// Finish the schema, rejecting definitions that could never validate
    /// consistently.
    pub fn build(self) -> SchemaResult<Schema> {
        let mut seen = HashSet::new();

        for entry in &self.fields {
            if !seen.insert(entry.name.as_str()) {
                return Err(SchemaError::duplicate_field(&self.name, &entry.name));
            }

            if let Some(reason) = entry.def.misuse.first() {
                return Err(SchemaError::rule_misuse(&self.name, &entry.name, reason.as_str()));
            }

            check_rule(&self.name, &entry.name, &entry.def.rule)?;
        }

        for refinement in &self.refinements {
            let Refinement::FieldsMatch { field, other, .. } = refinement;
            for name in [field, other] {
                if !seen.contains(name.as_str()) {
                    return Err(SchemaError::unknown_field(&self.name, name));
                }
            }
        }

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            refinements: self.refinements,
        })
    }
}

fn check_rule(schema: &str, field: &str, rule: &Rule) -> SchemaResult<()> {
    match rule {
        Rule::Enum { allowed } => {
            if allowed.is_empty() {
                return Err(SchemaError::empty_enum(schema, field));
            }
            let mut values = HashSet::new();
            for value in allowed {
                if !values.insert(value.as_str()) {
                    return Err(SchemaError::duplicate_enum_value(schema, field, value));
                }
            }
        }
        Rule::Integer {
            min: Some(min),
            max: Some(max),
        } if min > max => {
            return Err(SchemaError::invalid_bounds(schema, field, min, max));
        }
        Rule::String { checks } => {
            let min = checks
                .iter()
                .filter_map(|c| match c {
                    StringCheck::MinLength { len, .. } => Some(*len),
                    _ => None,
                })
                .max();
            let max = checks
                .iter()
                .filter_map(|c| match c {
                    StringCheck::MaxLength { len, .. } => Some(*len),
                    _ => None,
                })
                .min();
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(SchemaError::invalid_bounds(schema, field, min, max));
                }
            }
        }
        _ => {}
    }
    Ok(())
}
