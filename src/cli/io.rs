//! JSON I/O handling for CLI
//!
//! - Input: a single JSON object on stdin
//! - Output: a single JSON value on stdout, one line

use std::io::{self, Read, Write};

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::schema::RawInput;

/// Read a JSON object from `reader` as raw form input
pub fn read_input<R: Read>(mut reader: R) -> CliResult<RawInput> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }

    let value: Value = serde_json::from_str(&content)?;
    RawInput::from_json(value).ok_or_else(|| CliError::invalid_input("Expected a JSON object"))
}

/// Read a JSON object from stdin
pub fn read_stdin_input() -> CliResult<RawInput> {
    read_input(io::stdin().lock())
}

/// Write one JSON value to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error object to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_json(&serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;

    #[test]
    fn test_read_object() {
        let raw = read_input(r#"{"email": "ana@example.com", "remember": true}"#.as_bytes()).unwrap();
        assert_eq!(raw.get("email"), Some(&Value::from("ana@example.com")));
        assert_eq!(raw.get("remember"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_rejects_non_objects() {
        for input in ["", "   \n", "[1, 2]", "\"email\"", "{not json"] {
            let err = read_input(input.as_bytes()).unwrap_err();
            assert_eq!(err.code(), &CliErrorCode::InvalidInput, "{:?}", input);
        }
    }
}
