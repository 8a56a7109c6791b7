//! Token minting and inspection commands.

use std::net::IpAddr;
use std::sync::Arc;

use clap::{Args, Subcommand};
use uuid::Uuid;

use complyhub_auth::{Identity, PermissionResolver, RoleTable, TokenCodec};
use complyhub_core::config::AppConfig;
use complyhub_core::error::AppError;
use complyhub_core::types::{OrganizationId, SessionId, UserId};

use crate::output::{self, OutputFormat, Status};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Mint an access and refresh token pair
    Issue {
        /// User ID
        #[arg(long)]
        user_id: Uuid,
        /// User email
        #[arg(long)]
        email: String,
        /// Organization ID
        #[arg(long)]
        org: Uuid,
        /// Role names (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Session ID
        #[arg(long)]
        session: String,
        /// Client IP to bind into the access token
        #[arg(long)]
        ip: Option<IpAddr>,
    },
    /// Validate a token and print its claims
    Inspect {
        /// Encoded token
        token: String,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    config.auth.validate()?;
    let codec = TokenCodec::from_config(&config.auth)?;

    match &args.command {
        TokenCommand::Issue {
            user_id,
            email,
            org,
            roles,
            session,
            ip,
        } => {
            let resolver = PermissionResolver::new(Arc::new(RoleTable::from_config(&config.rbac)?));
            let identity = Identity {
                id: UserId::from_uuid(*user_id),
                email: email.clone(),
                organization_id: OrganizationId::from_uuid(*org),
                roles: roles.clone(),
                permissions: resolver.permissions_for_roles(roles.as_slice()),
            };
            let session_id = SessionId::new(session.clone());
            let pair = codec.generate_token_pair(&identity, &session_id, *ip)?;
            format.value(&pair)?;
        }
        TokenCommand::Inspect { token } => {
            let claims = codec.validate_token(token)?;
            format.value(&claims)?;
            if format == OutputFormat::Table {
                output::field("Expires at", &claims.expires_at().to_rfc3339());
                output::field("Remaining (s)", &claims.remaining_ttl_seconds().to_string());
            }
        }
    }

    Ok(())
}
