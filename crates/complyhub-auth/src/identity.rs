//! Identity supplied by the user-management layer.

use serde::{Deserialize, Serialize};

use complyhub_core::types::{OrganizationId, UserId};

/// The authenticated user as known at the time a token is minted.
///
/// Fetched by the caller; the auth core never loads it itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Tenant organization.
    pub organization_id: OrganizationId,
    /// Assigned role names.
    pub roles: Vec<String>,
    /// Denormalized permission names (`resource:action:scope`).
    pub permissions: Vec<String>,
}

impl Identity {
    /// Creates an identity with no roles or permissions.
    pub fn new(id: UserId, email: impl Into<String>, organization_id: OrganizationId) -> Self {
        Self {
            id,
            email: email.into(),
            organization_id,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// Adds a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Replaces the denormalized permission list.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}
