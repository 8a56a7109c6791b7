//! Role and permission definitions, and the immutable role table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use complyhub_core::config::{RbacConfig, RoleDefinition};
use complyhub_core::types::OrganizationId;

use crate::error::{AuthError, AuthResult};

/// Literal that matches any resource, action, or scope.
pub const WILDCARD: &str = "*";

/// Breadth of a grant or request.
///
/// `Organization` covers `Team` covers `Own`. `Any` (`*`) covers every
/// scope. Scopes outside the hierarchy only match themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    /// Wildcard `*`.
    Any,
    /// Everything within the organization.
    Organization,
    /// Everything within the caller's team.
    Team,
    /// Only records the caller owns.
    Own,
    /// A scope name the hierarchy does not know.
    Other(String),
}

impl Scope {
    /// Whether a permission granted at `self` satisfies a request at `requested`.
    ///
    /// Broader grants satisfy narrower requests, never the reverse.
    pub fn includes(&self, requested: &Scope) -> bool {
        if self == requested {
            return true;
        }
        match self {
            Self::Any => true,
            Self::Organization => matches!(requested, Self::Team | Self::Own),
            Self::Team => matches!(requested, Self::Own),
            Self::Own | Self::Other(_) => false,
        }
    }

    /// Scope name as written in permission strings.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => WILDCARD,
            Self::Organization => "organization",
            Self::Team => "team",
            Self::Own => "own",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        match value {
            WILDCARD => Self::Any,
            "organization" => Self::Organization,
            "team" => Self::Team,
            "own" => Self::Own,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.as_str().to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(resource, action, scope)` grant. Resource and action may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Resource name or `*`.
    pub resource: String,
    /// Action name or `*`.
    pub action: String,
    /// Scope of the grant.
    pub scope: Scope,
}

impl Permission {
    /// Creates a permission.
    pub fn new(resource: impl Into<String>, action: impl Into<String>, scope: Scope) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            scope,
        }
    }

    /// Whether this grant covers the requested triple.
    pub fn matches(&self, resource: &str, action: &str, scope: &Scope) -> bool {
        (self.resource == WILDCARD || self.resource == resource)
            && (self.action == WILDCARD || self.action == action)
            && self.scope.includes(scope)
    }

    /// Denormalized `resource:action:scope` name.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.resource, self.action, self.scope)
    }
}

impl FromStr for Permission {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [resource, action, scope]
                if !resource.is_empty() && !action.is_empty() && !scope.is_empty() =>
            {
                Ok(Self::new(*resource, *action, Scope::from(*scope)))
            }
            _ => Err(AuthError::Configuration(format!(
                "invalid permission '{s}': expected resource:action:scope"
            ))),
        }
    }
}

/// Who owns a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Built in and immutable.
    System,
    /// Custom role of one organization.
    Organization(OrganizationId),
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("the system"),
            Self::Organization(owner) => write!(f, "organization {owner}"),
        }
    }
}

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Display precedence; never consulted for authorization.
    pub priority: i32,
    /// Owner.
    pub kind: RoleKind,
    /// Grants, in no particular order.
    pub permissions: Vec<Permission>,
}

impl Role {
    /// Creates a system role.
    pub fn system(
        name: impl Into<String>,
        priority: i32,
        description: impl Into<String>,
        permissions: Vec<Permission>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            kind: RoleKind::System,
            permissions,
        }
    }

    /// Whether members of `organization` may use this role.
    pub fn is_available_to(&self, organization: OrganizationId) -> bool {
        match self.kind {
            RoleKind::System => true,
            RoleKind::Organization(owner) => owner == organization,
        }
    }

    /// Whether any of this role's permissions covers the request.
    pub fn grants(&self, resource: &str, action: &str, scope: &Scope) -> bool {
        self.permissions
            .iter()
            .any(|p| p.matches(resource, action, scope))
    }
}

impl TryFrom<&RoleDefinition> for Role {
    type Error = AuthError;

    fn try_from(def: &RoleDefinition) -> Result<Self, Self::Error> {
        let permissions = def
            .permissions
            .iter()
            .map(|p| p.parse())
            .collect::<AuthResult<Vec<Permission>>>()?;

        Ok(Self {
            name: def.name.clone(),
            description: def.description.clone(),
            priority: def.priority,
            kind: def
                .organization_id
                .map(|id| RoleKind::Organization(OrganizationId::from_uuid(id)))
                .unwrap_or(RoleKind::System),
            permissions,
        })
    }
}

/// Immutable name → role mapping.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: HashMap<String, Role>,
}

impl RoleTable {
    /// Builds a table from roles. Later duplicates replace earlier ones.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    /// The built-in compliance roles.
    pub fn system_defaults() -> Self {
        use Scope::{Any, Organization, Own, Team};
        fn p(resource: &str, action: &str, scope: Scope) -> Permission {
            Permission::new(resource, action, scope)
        }

        Self::new([
            Role::system(
                "super_admin",
                100,
                "Unrestricted platform administrator",
                vec![p("*", "*", Any)],
            ),
            Role::system(
                "org_admin",
                90,
                "Administers everything inside one organization",
                vec![p("*", "*", Organization)],
            ),
            Role::system(
                "compliance_manager",
                70,
                "Owns the control framework and policies",
                vec![
                    p("controls", "*", Organization),
                    p("policies", "*", Organization),
                    p("evidence", "*", Organization),
                    p("frameworks", "read", Organization),
                    p("reports", "read", Organization),
                ],
            ),
            Role::system(
                "audit_manager",
                60,
                "Plans audits and assigns work to the audit team",
                vec![
                    p("audits", "*", Organization),
                    p("assignments", "*", Team),
                    p("findings", "*", Team),
                    p("controls", "read", Organization),
                    p("evidence", "read", Organization),
                ],
            ),
            Role::system(
                "auditor",
                40,
                "Tests controls and records findings",
                vec![
                    p("controls", "read", Organization),
                    p("evidence", "read", Organization),
                    p("audits", "read", Team),
                    p("findings", "create", Own),
                    p("findings", "update", Own),
                    p("assignments", "read", Own),
                ],
            ),
            Role::system(
                "control_owner",
                30,
                "Operates controls and uploads evidence",
                vec![
                    p("controls", "read", Team),
                    p("controls", "update", Own),
                    p("evidence", "create", Own),
                    p("evidence", "update", Own),
                    p("tasks", "*", Own),
                ],
            ),
            Role::system(
                "viewer",
                10,
                "Read-only access to published material",
                vec![
                    p("policies", "read", Organization),
                    p("controls", "read", Team),
                    p("reports", "read", Team),
                ],
            ),
        ])
    }

    /// Builds the table described by `[rbac]` configuration.
    pub fn from_config(config: &RbacConfig) -> AuthResult<Self> {
        let base = if config.include_system_roles {
            Self::system_defaults()
        } else {
            Self::default()
        };
        let extra = config
            .roles
            .iter()
            .map(Role::try_from)
            .collect::<AuthResult<Vec<Role>>>()?;
        base.with_organization_roles(extra)
    }

    /// Returns a new table with additional roles.
    ///
    /// A role may only replace one with the same owner: system roles are
    /// fixed, and one organization can never take over another's role name.
    pub fn with_organization_roles(
        &self,
        roles: impl IntoIterator<Item = Role>,
    ) -> AuthResult<Self> {
        let mut table = self.clone();
        for role in roles {
            if let Some(existing) = table.roles.get(&role.name) {
                if existing.kind != role.kind || existing.kind == RoleKind::System {
                    return Err(AuthError::Configuration(format!(
                        "role '{}' is already owned by {}",
                        role.name, existing.kind
                    )));
                }
            }
            table.roles.insert(role.name.clone(), role);
        }
        Ok(table)
    }

    /// Looks up a role by name.
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Iterates roles in descending priority, then by name.
    pub fn roles(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.values().collect();
        roles.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        roles
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the table has no roles.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
