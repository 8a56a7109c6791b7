//! Role table configuration.
//!
//! Organization-specific roles are described here as plain data; the auth
//! crate turns them into its typed role table at start-up.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Whether the built-in system roles are loaded before `roles`.
    #[serde(default = "default_true")]
    pub include_system_roles: bool,
    /// Additional role definitions.
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            include_system_roles: true,
            roles: Vec::new(),
        }
    }
}

/// A single role definition as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Unique role name.
    pub name: String,
    /// Display precedence; higher wins.
    #[serde(default)]
    pub priority: i32,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Owning organization. `None` marks a system role.
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    /// Permissions in `resource:action:scope` form.
    #[serde(default)]
    pub permissions: Vec<String>,
}

fn default_true() -> bool {
    true
}
