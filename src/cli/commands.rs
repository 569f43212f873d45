//! CLI command implementations
//!
//! `serve` and `dispatch` build services from configuration, then the
//! feature registry. Any failure before the first request is fatal.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::config::AppConfig;
use crate::features::{FeatureName, Features};
use crate::http_server::HttpServer;
use crate::observability::{Event, Logger, Severity};
use crate::services::Services;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_stdin_input, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Validate { feature } => validate(feature),
        Command::Dispatch { feature, config } => dispatch(feature, config.as_deref()),
        Command::CheckConfig { config } => check_config(&config),
        Command::Describe { feature } => describe(feature),
    }
}

/// Defaults when no path is given
pub fn load_config(path: Option<&Path>) -> CliResult<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    Logger::emit(Severity::Info, Event::ConfigLoaded, &[("source", &source)]);

    Ok(config)
}

/// Build services and features from configuration
pub fn boot(config: &AppConfig) -> CliResult<(Services, Arc<Features>)> {
    let services = Services::from_config(config)?;
    let features = Arc::new(Features::new(&services)?);

    let count = FeatureName::ALL.len().to_string();
    Logger::emit(Severity::Info, Event::FeaturesReady, &[("features", &count)]);

    Ok((services, features))
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::boot_failed(format!("Failed to start runtime: {}", e)))
}

/// Boot and serve HTTP until interrupted
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    Logger::emit(Severity::Info, Event::BootStart, &[("command", "serve")]);

    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
        config.validate()?;
    }

    let (_services, features) = boot(&config)?;
    let server = HttpServer::new(config.http.clone(), features);

    runtime()?
        .block_on(server.start())
        .map_err(|e| CliError::server_failed(e.to_string()))
}

/// Schema check only; prints the validation report
pub fn validate(feature: FeatureName) -> CliResult<()> {
    let raw = read_stdin_input()?;
    let features = Features::new(&Services::in_memory())?;
    write_json(&features.check(feature, &raw))
}

/// Full dispatch against fresh in-memory state
pub fn dispatch(feature: FeatureName, config_path: Option<&Path>) -> CliResult<()> {
    let raw = read_stdin_input()?;
    let config = load_config(config_path)?;
    let (_services, features) = boot(&config)?;

    let (status, body) = runtime()?.block_on(features.dispatch_json(feature, &raw));
    write_json(&json!({ "httpStatus": status, "result": body }))
}

pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = load_config(Some(config_path))?;
    write_json(&json!({
        "valid": true,
        "http": config.http.socket_addr(),
        "emailConfigured": config.email.is_some(),
        "seedUsers": config.seed_users.len(),
    }))
}

pub fn describe(feature: FeatureName) -> CliResult<()> {
    let features = Features::new(&Services::in_memory())?;
    write_json(&json!({
        "feature": feature.as_str(),
        "action": action_name(&features, feature),
        "schema": features.schema(feature),
    }))
}

fn action_name(features: &Features, feature: FeatureName) -> &'static str {
    match feature {
        FeatureName::Signup => features.signup.name(),
        FeatureName::Login => features.login.name(),
        FeatureName::ResetPassword => features.reset_password.name(),
        FeatureName::VerifyOtp => features.verify_otp.name(),
        FeatureName::UpdatePassword => features.update_password.name(),
        FeatureName::Billing => features.billing.name(),
        FeatureName::Settings => features.settings.name(),
        FeatureName::Support => features.support.name(),
        FeatureName::Notifications => features.notifications.name(),
        FeatureName::Contact => features.contact.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRepository;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_boot_creates_seed_users() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"seed_users": [{{"email": "admin@example.com", "password": "Adm1nPass!", "role": "admin"}}]}}"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        let (services, _features) = boot(&config).unwrap();
        assert!(services
            .users
            .find_by_email("admin@example.com")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"http": {{"port": 0}}}}"#).unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert_eq!(err.code_str(), "FORMGATE_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_action_names() {
        let features = Features::new(&Services::in_memory()).unwrap();
        assert_eq!(action_name(&features, FeatureName::Billing), "save_payment_method");
        assert_eq!(action_name(&features, FeatureName::Login), "login");
        assert_eq!(action_name(&features, FeatureName::Contact), "submit_contact_form");
    }
}
