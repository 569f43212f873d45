//! formgate CLI entry point
//!
//! Parses arguments, runs the command, and exits non-zero on failure.
//! All logic lives in the CLI module.

use formgate::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code_str(), e.message());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
