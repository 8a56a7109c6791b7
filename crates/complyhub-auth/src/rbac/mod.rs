//! Role-based access control with scope hierarchy.

pub mod policies;
pub mod resolver;

pub use policies::{Permission, Role, RoleKind, RoleTable, Scope};
pub use resolver::PermissionResolver;
