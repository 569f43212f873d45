//! CLI module for formgate
//!
//! Provides command-line interface for:
//! - serve: Boot and serve features over HTTP
//! - validate: Schema-check a submission read from stdin
//! - dispatch: Run one submission end to end
//! - check-config: Validate a configuration file
//! - describe: Print a feature's field definitions

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    boot, check_config, describe, dispatch, load_config, run, run_command, serve, validate,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_input, read_stdin_input, write_error, write_json};
