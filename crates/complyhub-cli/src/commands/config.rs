//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use complyhub_core::config::AppConfig;
use complyhub_core::error::AppError;

use crate::output::{self, OutputFormat, Status};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration with secrets masked
    Show,
    /// Validate the merged configuration
    Check,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let shown = AppConfig {
                auth: config.auth.redacted(),
                ..config.clone()
            };
            match format {
                OutputFormat::Json => format.value(&shown)?,
                OutputFormat::Table => {
                    output::field("Algorithm", &shown.auth.signing_algorithm);
                    output::field("Issuer", &shown.auth.issuer);
                    output::field("Audience", &shown.auth.audience);
                    output::field(
                        "Access TTL (min)",
                        &shown.auth.access_token_ttl_minutes.to_string(),
                    );
                    output::field(
                        "Refresh TTL (days)",
                        &shown.auth.refresh_token_ttl_days.to_string(),
                    );
                    output::field("Hash cost", &shown.auth.password_hash_cost.to_string());
                    output::field("Signing secret", &shown.auth.signing_secret);
                    output::field("Custom roles", &shown.rbac.roles.len().to_string());
                    output::field("Log level", &shown.logging.level);
                }
            }
        }
        ConfigCommand::Check => match config.validate() {
            Ok(()) => {
                let msg = format!("Configuration '{config_path}' is valid");
                output::status(Status::Ok, &msg);
            }
            Err(e) => {
                output::status(Status::Fail, &format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
    }

    Ok(())
}
