//! CLI argument definitions using clap
//!
//! Commands:
//! - formgate serve [--config <path>] [--port <port>]
//! - formgate validate <feature>
//! - formgate dispatch <feature> [--config <path>]
//! - formgate check-config --config <path>
//! - formgate describe <feature>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::features::FeatureName;

/// formgate - schema-validated form actions for a client portal
#[derive(Parser, Debug)]
#[command(name = "formgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve every feature over HTTP
    Serve {
        /// Path to configuration file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a JSON object from stdin without running the action
    Validate {
        #[arg(value_enum)]
        feature: FeatureName,
    },

    /// Validate and run a feature once against fresh in-memory state
    Dispatch {
        #[arg(value_enum)]
        feature: FeatureName,

        /// Path to configuration file; seed users are created from it
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load and validate a configuration file
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },

    /// Print the field definitions of a feature
    Describe {
        #[arg(value_enum)]
        feature: FeatureName,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
