//! Schema definition errors
//!
//! Error codes:
//! - FORMGATE_SCHEMA_DUPLICATE_FIELD (FATAL)
//! - FORMGATE_SCHEMA_EMPTY_ENUM (FATAL)
//! - FORMGATE_SCHEMA_DUPLICATE_ENUM_VALUE (FATAL)
//! - FORMGATE_SCHEMA_INVALID_BOUNDS (FATAL)
//! - FORMGATE_SCHEMA_RULE_MISUSE (FATAL)
//! - FORMGATE_SCHEMA_UNKNOWN_FIELD (FATAL)
//!
//! These are raised while a schema is being built, never while input is
//! being validated. A schema that fails to build must stop startup.

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The process must not start with this schema
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema definition error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Two fields share a name
    DuplicateField,
    /// Enumerated rule declares no allowed values
    EmptyEnum,
    /// Enumerated rule lists the same value twice
    DuplicateEnumValue,
    /// Minimum bound exceeds maximum bound
    InvalidBounds,
    /// Modifier applied to a rule kind that does not support it
    RuleMisuse,
    /// Refinement references a field the schema does not declare
    UnknownField,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::DuplicateField => "FORMGATE_SCHEMA_DUPLICATE_FIELD",
            SchemaErrorCode::EmptyEnum => "FORMGATE_SCHEMA_EMPTY_ENUM",
            SchemaErrorCode::DuplicateEnumValue => "FORMGATE_SCHEMA_DUPLICATE_ENUM_VALUE",
            SchemaErrorCode::InvalidBounds => "FORMGATE_SCHEMA_INVALID_BOUNDS",
            SchemaErrorCode::RuleMisuse => "FORMGATE_SCHEMA_RULE_MISUSE",
            SchemaErrorCode::UnknownField => "FORMGATE_SCHEMA_UNKNOWN_FIELD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    schema: String,
    field: Option<String>,
}

impl SchemaError {
    fn new(
        code: SchemaErrorCode,
        schema: impl Into<String>,
        field: Option<String>,
        message: String,
    ) -> Self {
        Self {
            code,
            message,
            schema: schema.into(),
            field,
        }
    }

    /// Create a duplicate field error
    pub fn duplicate_field(schema: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Field '{}' is declared more than once", field);
        Self::new(SchemaErrorCode::DuplicateField, schema, Some(field), message)
    }

    /// Create an empty enumerated set error
    pub fn empty_enum(schema: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Field '{}' declares no allowed values", field);
        Self::new(SchemaErrorCode::EmptyEnum, schema, Some(field), message)
    }

    /// Create a duplicate enumerated value error
    pub fn duplicate_enum_value(
        schema: impl Into<String>,
        field: impl Into<String>,
        value: &str,
    ) -> Self {
        let field = field.into();
        let message = format!("Field '{}' lists allowed value '{}' twice", field, value);
        Self::new(SchemaErrorCode::DuplicateEnumValue, schema, Some(field), message)
    }

    /// Create an invalid bounds error
    pub fn invalid_bounds(
        schema: impl Into<String>,
        field: impl Into<String>,
        min: impl fmt::Display,
        max: impl fmt::Display,
    ) -> Self {
        let field = field.into();
        let message = format!("Field '{}' has minimum {} above maximum {}", field, min, max);
        Self::new(SchemaErrorCode::InvalidBounds, schema, Some(field), message)
    }

    /// Create a rule misuse error
    pub fn rule_misuse(
        schema: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let message = format!("Field '{}': {}", field, reason.into());
        Self::new(SchemaErrorCode::RuleMisuse, schema, Some(field), message)
    }

    /// Create an unknown field error
    pub fn unknown_field(schema: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Refinement references undeclared field '{}'", field);
        Self::new(SchemaErrorCode::UnknownField, schema, Some(field), message)
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the name of the schema being built
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the offending field if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: schema '{}': {}",
            self.code.severity(),
            self.code.code(),
            self.schema,
            self.message
        )
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
