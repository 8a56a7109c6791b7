//! Password hashing commands.

use clap::{Args, Subcommand};

use complyhub_auth::PasswordHasher;
use complyhub_auth::password::{estimate_strength, hash_cost};
use complyhub_core::config::AppConfig;
use complyhub_core::error::AppError;

use crate::output::{self, OutputFormat, Status};

/// Arguments for password commands
#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Password subcommand
    #[command(subcommand)]
    pub command: PasswordCommand,
}

/// Password subcommands
#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Hash a password read from the terminal
    Hash,
    /// Check a password against a stored hash
    Verify {
        /// Stored PHC hash
        hash: String,
    },
    /// Show the work factor of a stored hash
    Cost {
        /// Stored PHC hash
        hash: String,
    },
    /// Estimate the strength of a password
    Strength {
        /// Email or other user inputs to penalise
        #[arg(short, long)]
        input: Vec<String>,
    },
}

/// Execute password commands
pub async fn execute(
    args: &PasswordArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let hasher = PasswordHasher::new(&config.auth)?;

    match &args.command {
        PasswordCommand::Hash => {
            let password = super::prompt_password("Password", true)?;
            let hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
                .await
                .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))??;
            println!("{}", hash);
        }
        PasswordCommand::Verify { hash } => {
            let password = super::prompt_password("Password", false)?;
            let stored = hash.clone();
            let matched =
                tokio::task::spawn_blocking(move || hasher.verify_password(&password, &stored))
                    .await
                    .map_err(|e| AppError::internal(format!("Verify task failed: {}", e)))??;
            if matched {
                output::status(Status::Ok, "Password matches");
            } else {
                output::status(Status::Fail, "Password does not match");
                return Err(AppError::authentication("Invalid credentials"));
            }
        }
        PasswordCommand::Cost { hash } => {
            let cost = hash_cost(hash)?;
            let stale = hasher.needs_rehash(hash)?;
            match format {
                OutputFormat::Json => {
                    format.value(&serde_json::json!({ "cost": cost, "needs_rehash": stale }))?
                }
                OutputFormat::Table => {
                    output::field("Iterations", &cost.iterations.to_string());
                    output::field("Memory (KiB)", &cost.memory_kib.to_string());
                    output::field("Parallelism", &cost.parallelism.to_string());
                    if stale {
                        output::status(
                            Status::Warn,
                            "Hash cost differs from configuration; rehash on next login",
                        );
                    } else {
                        output::status(Status::Ok, "Hash cost is current");
                    }
                }
            }
        }
        PasswordCommand::Strength { input } => {
            let password = super::prompt_password("Password", false)?;
            let inputs: Vec<&str> = input.iter().map(String::as_str).collect();
            let report = estimate_strength(&password, &inputs);
            match format {
                OutputFormat::Json => format.value(&report)?,
                OutputFormat::Table => {
                    output::field("Score", &format!("{}/4", report.score));
                    output::field("Guesses (log10)", &format!("{:.1}", report.guesses_log10));
                    if let Some(warning) = &report.warning {
                        output::field("Warning", warning);
                    }
                    if report.is_acceptable() {
                        output::status(Status::Ok, "Password strength is acceptable");
                    } else {
                        output::status(
                            Status::Warn,
                            "Password is weak; consider a longer passphrase",
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
