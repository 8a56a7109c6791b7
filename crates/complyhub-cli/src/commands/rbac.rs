//! Role table commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use complyhub_auth::rbac::RoleKind;
use complyhub_auth::{PermissionResolver, Role, RoleTable};
use complyhub_core::config::AppConfig;
use complyhub_core::error::AppError;

use crate::output::{self, OutputFormat, Status};

/// Arguments for rbac commands
#[derive(Debug, Args)]
pub struct RbacArgs {
    /// Rbac subcommand
    #[command(subcommand)]
    pub command: RbacCommand,
}

/// Rbac subcommands
#[derive(Debug, Subcommand)]
pub enum RbacCommand {
    /// List the configured roles
    Roles,
    /// Check whether roles grant a permission
    Check {
        /// Role names (repeatable)
        #[arg(long = "role", required = true)]
        roles: Vec<String>,
        /// Resource name
        resource: String,
        /// Action name
        action: String,
        /// Requested scope
        scope: String,
    },
}

/// Table row for a role
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    #[tabled(rename = "Role")]
    name: String,
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
}

impl From<&Role> for RoleRow {
    fn from(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
            priority: role.priority,
            owner: match role.kind {
                RoleKind::System => "system".to_string(),
                RoleKind::Organization(org) => org.to_string(),
            },
            permissions: role
                .permissions
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Execute rbac commands
pub fn execute(args: &RbacArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let resolver = PermissionResolver::new(Arc::new(RoleTable::from_config(&config.rbac)?));

    match &args.command {
        RbacCommand::Roles => {
            let rows: Vec<RoleRow> = resolver
                .table()
                .roles()
                .into_iter()
                .map(RoleRow::from)
                .collect();
            format.rows(&rows)?;
        }
        RbacCommand::Check {
            roles,
            resource,
            action,
            scope,
        } => {
            let triple = format!("{}:{}:{}", resource, action, scope);
            match resolver.validate_permission(roles.as_slice(), resource, action, scope) {
                Ok(()) => output::status(Status::Ok, &format!("Granted {}", triple)),
                Err(e) => {
                    output::status(Status::Fail, &format!("Denied {}", triple));
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
