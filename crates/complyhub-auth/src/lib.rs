//! # complyhub-auth
//!
//! Authentication and authorization core for the ComplyHub compliance
//! platform. Pure and synchronous: no I/O, no persistence, no transport.
//!
//! ## Modules
//!
//! - `password`: Argon2id password hashing, cost audits, strength estimates
//! - `jwt`: signed access/refresh tokens and their validation
//! - `session`: login, token pairs, and access-token refresh
//! - `rbac`: role table and scope-aware permission resolution

pub mod error;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use error::{AuthError, AuthResult};
pub use identity::Identity;
pub use jwt::{Claims, TokenCodec, TokenKeys, TokenPair, TokenSettings, TokenType};
pub use password::{HashCost, PasswordHasher};
pub use rbac::{Permission, PermissionResolver, Role, RoleTable, Scope};
pub use session::SessionIssuer;
