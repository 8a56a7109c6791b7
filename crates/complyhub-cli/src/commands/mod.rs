//! CLI command definitions and dispatch.

pub mod config;
pub mod password;
pub mod rbac;
pub mod token;

use clap::{Parser, Subcommand};

use complyhub_core::config::AppConfig;
use complyhub_core::error::AppError;

use crate::output::OutputFormat;

/// ComplyHub authentication tooling
#[derive(Debug, Parser)]
#[command(name = "complyhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}`
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Password hashing utilities
    Password(password::PasswordArgs),
    /// Token minting and inspection
    Token(token::TokenArgs),
    /// Role table queries
    Rbac(rbac::RbacArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load the merged configuration selected by the global flags
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, self.env.as_deref())
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Password(args) => password::execute(args, config, self.format).await,
            Commands::Token(args) => token::execute(args, config, self.format),
            Commands::Rbac(args) => rbac::execute(args, config, self.format),
            Commands::Config(args) => config::execute(args, config, &self.config, self.format),
        }
    }
}

/// Read a secret interactively without echo.
pub fn prompt_password(prompt: &str, confirm: bool) -> Result<String, AppError> {
    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}
