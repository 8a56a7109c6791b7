//! Error taxonomy for the auth core.
//!
//! Variants are kept fine-grained so callers can tell a failed login from a
//! corrupt stored hash, or an expired token from a forged one. Use
//! [`AuthError::public_message`] for anything shown to end users.

use thiserror::Error;

use complyhub_core::error::{AppError, ErrorKind};

use crate::jwt::TokenType;

/// Message returned to end users for every credential failure.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// All failures the auth core can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The plaintext password was rejected before hashing.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// A stored credential hash could not be decoded.
    #[error("stored password hash is invalid: {0}")]
    HashDecode(String),

    /// The hashing primitive failed on otherwise valid input.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Login failed. Deliberately silent about why.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Signature, issuer, audience, algorithm, or structure check failed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token was valid but its lifetime has elapsed.
    #[error("token has expired")]
    TokenExpired,

    /// A structurally valid token of the wrong kind was presented.
    #[error("wrong token type: expected {expected}, got {actual}")]
    WrongTokenType {
        /// Kind required by the operation.
        expected: TokenType,
        /// Kind carried by the token.
        actual: TokenType,
    },

    /// Key material or token settings are unusable.
    #[error("auth configuration error: {0}")]
    Configuration(String),

    /// The token could not be signed.
    #[error("token encoding failed: {0}")]
    TokenEncoding(String),

    /// No role grants the requested permission.
    #[error("insufficient permissions for {resource}:{action}:{scope}")]
    InsufficientPermissions {
        /// Requested resource.
        resource: String,
        /// Requested action.
        action: String,
        /// Requested scope.
        scope: String,
    },
}

impl AuthError {
    /// Whether the caller should treat this as "not authenticated".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidToken(_)
                | Self::TokenExpired
                | Self::WrongTokenType { .. }
        )
    }

    /// Whether presenting a refresh token could recover from this error.
    pub fn is_retryable_with_refresh(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }

    /// A message safe to return to end users.
    ///
    /// Credential and hash-integrity failures share one message so responses
    /// never reveal whether an account exists or how its hash is stored.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::WeakPassword(_) => "Password does not meet the length policy",
            Self::HashDecode(_) | Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE,
            Self::TokenExpired => "Session expired",
            Self::InvalidToken(_) | Self::WrongTokenType { .. } => "Not authenticated",
            Self::InsufficientPermissions { .. } => "Forbidden",
            Self::Hashing(_) | Self::TokenEncoding(_) | Self::Configuration(_) => "Internal error",
        }
    }

    pub(crate) fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken(reason.into())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::WeakPassword(_) => ErrorKind::Validation,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::WrongTokenType { .. } => ErrorKind::Authentication,
            AuthError::InsufficientPermissions { .. } => ErrorKind::Authorization,
            AuthError::Configuration(_) => ErrorKind::Configuration,
            AuthError::HashDecode(_) | AuthError::Hashing(_) | AuthError::TokenEncoding(_) => {
                ErrorKind::Internal
            }
        };
        let message = err.to_string();
        AppError::with_source(kind, message, err)
    }
}

/// Result alias for the auth core.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_public_message() {
        let mismatch = AuthError::InvalidCredentials;
        let corrupt = AuthError::HashDecode("bad salt".to_string());
        assert_eq!(mismatch.public_message(), corrupt.public_message());
        assert_ne!(mismatch.to_string(), corrupt.to_string());
    }

    #[test]
    fn test_only_expiry_is_refreshable() {
        assert!(AuthError::TokenExpired.is_retryable_with_refresh());
        assert!(!AuthError::invalid_token("bad signature").is_retryable_with_refresh());
        let wrong = AuthError::WrongTokenType {
            expected: TokenType::Refresh,
            actual: TokenType::Access,
        };
        assert!(!wrong.is_retryable_with_refresh());
        assert!(wrong.is_authentication_failure());
    }

    #[test]
    fn test_app_error_kind_mapping() {
        let denied = AuthError::InsufficientPermissions {
            resource: "controls".to_string(),
            action: "write".to_string(),
            scope: "organization".to_string(),
        };
        assert_eq!(AppError::from(denied).kind, ErrorKind::Authorization);
        assert_eq!(
            AppError::from(AuthError::HashDecode("x".into())).kind,
            ErrorKind::Internal
        );
        assert_eq!(
            AppError::from(AuthError::WeakPassword("short".into())).kind,
            ErrorKind::Validation
        );
    }
}
