//! Permission resolution: decides whether a set of roles grants a request.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use complyhub_core::types::OrganizationId;

use crate::error::{AuthError, AuthResult};
use crate::jwt::decoder::require_type;
use crate::jwt::{Claims, TokenType};

use super::policies::{Role, RoleTable, Scope};

/// Resolves role names against an immutable role table.
///
/// Grants are purely additive: a request is allowed when any permission of
/// any listed role covers it. Unknown role names grant nothing.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    /// The role table.
    table: Arc<RoleTable>,
}

impl PermissionResolver {
    /// Creates a resolver over `table`.
    pub fn new(table: Arc<RoleTable>) -> Self {
        Self { table }
    }

    /// Creates a resolver over the built-in system roles.
    pub fn with_system_roles() -> Self {
        Self::new(Arc::new(RoleTable::system_defaults()))
    }

    /// Whether any of `roles` grants `(resource, action, scope)`.
    pub fn has_permission<S: AsRef<str>>(
        &self,
        roles: &[S],
        resource: &str,
        action: &str,
        scope: &str,
    ) -> bool {
        self.grants(roles, None, resource, action, scope)
    }

    /// Like [`has_permission`](Self::has_permission), but fails with
    /// `InsufficientPermissions` carrying the denied triple.
    pub fn validate_permission<S: AsRef<str>>(
        &self,
        roles: &[S],
        resource: &str,
        action: &str,
        scope: &str,
    ) -> AuthResult<()> {
        self.check(roles, None, resource, action, scope)
    }

    /// Authorizes a request using the roles carried by validated access-token
    /// claims. Roles owned by an organization other than the token's are
    /// ignored.
    pub fn authorize_claims(
        &self,
        claims: &Claims,
        resource: &str,
        action: &str,
        scope: &str,
    ) -> AuthResult<()> {
        require_type(claims, TokenType::Access)?;
        self.check(
            claims.roles.as_slice(),
            Some(claims.org_id),
            resource,
            action,
            scope,
        )
    }

    fn grants<S: AsRef<str>>(
        &self,
        roles: &[S],
        tenant: Option<OrganizationId>,
        resource: &str,
        action: &str,
        scope: &str,
    ) -> bool {
        let requested = Scope::from(scope);
        roles
            .iter()
            .filter_map(|name| self.table.get(name.as_ref()))
            .filter(|role| tenant.is_none_or(|org| role.is_available_to(org)))
            .any(|role| role.grants(resource, action, &requested))
    }

    fn check<S: AsRef<str>>(
        &self,
        roles: &[S],
        tenant: Option<OrganizationId>,
        resource: &str,
        action: &str,
        scope: &str,
    ) -> AuthResult<()> {
        if self.grants(roles, tenant, resource, action, scope) {
            return Ok(());
        }

        let role_names: Vec<&str> = roles.iter().map(AsRef::as_ref).collect();
        warn!(roles = ?role_names, resource, action, scope, "Permission denied");
        Err(AuthError::InsufficientPermissions {
            resource: resource.to_string(),
            action: action.to_string(),
            scope: scope.to_string(),
        })
    }

    /// Sorted, de-duplicated permission names granted by `roles`, for the
    /// denormalized list embedded in access tokens.
    pub fn permissions_for_roles<S: AsRef<str>>(&self, roles: &[S]) -> Vec<String> {
        roles
            .iter()
            .filter_map(|name| self.table.get(name.as_ref()))
            .flat_map(|role| role.permissions.iter().map(|p| p.name()))
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Highest-priority known role among `roles`, for display.
    pub fn primary_role<S: AsRef<str>>(&self, roles: &[S]) -> Option<&Role> {
        roles
            .iter()
            .filter_map(|name| self.table.get(name.as_ref()))
            .max_by(|a, b| a.priority.cmp(&b.priority).then_with(|| b.name.cmp(&a.name)))
    }

    /// Returns the underlying role table.
    pub fn table(&self) -> &RoleTable {
        &self.table
    }
}

impl Default for PermissionResolver {
    fn default() -> Self {
        Self::with_system_roles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_grants_nothing() {
        let resolver = PermissionResolver::default();
        assert!(!resolver.has_permission(&["ghost"], "controls", "read", "own"));
        assert!(!resolver.has_permission::<&str>(&[], "controls", "read", "own"));
    }

    #[test]
    fn test_or_across_roles() {
        let resolver = PermissionResolver::default();
        assert!(!resolver.has_permission(&["viewer"], "findings", "create", "own"));
        assert!(resolver.has_permission(&["viewer", "auditor"], "findings", "create", "own"));
        assert!(resolver.has_permission(&["ghost", "auditor"], "findings", "create", "own"));
    }

    #[test]
    fn test_validate_permission_carries_triple() {
        let resolver = PermissionResolver::default();
        let err = resolver
            .validate_permission(&["auditor"], "controls", "write", "organization")
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::InsufficientPermissions {
                resource: "controls".to_string(),
                action: "write".to_string(),
                scope: "organization".to_string(),
            }
        );
    }

    #[test]
    fn test_permissions_for_roles_dedups() {
        let resolver = PermissionResolver::default();
        let perms = resolver.permissions_for_roles(&["auditor", "auditor", "ghost"]);
        assert!(perms.contains(&"controls:read:organization".to_string()));
        let mut sorted = perms.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(perms, sorted);
    }

    #[test]
    fn test_primary_role_by_priority() {
        let resolver = PermissionResolver::default();
        let primary = resolver.primary_role(&["viewer", "audit_manager", "auditor"]);
        assert_eq!(primary.map(|r| r.name.as_str()), Some("audit_manager"));
        assert!(resolver.primary_role(&["ghost"]).is_none());
    }
}
