//! Schema subsystem for formgate
//!
//! Schemas describe what a form submission must look like. They are built
//! once at startup, are immutable afterwards, and validate raw input into
//! a typed value or a field-addressable error report.
//!
//! # Design Principles
//!
//! - Definition errors are fatal and surface at build time
//! - Validation is total: it never panics
//! - Validation is deterministic
//! - Every failing field is reported in a single pass
//! - Undeclared input fields are ignored

mod errors;
mod input;
mod report;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use input::RawInput;
pub use report::{FieldErrors, ValidationResult};
pub use types::{
    boolean, integer, one_of, string, CharClass, FieldDef, FieldEntry, Format, Refinement, Rule,
    Schema, SchemaBuilder, StringCheck,
};
pub use validator::{validate, INVALID_INPUT_MESSAGE};
