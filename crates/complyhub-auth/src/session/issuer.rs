//! Session issuance: login, token pairs, and access-token refresh.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use complyhub_core::types::SessionId;

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;
use crate::jwt::decoder::require_type;
use crate::jwt::{Claims, TokenCodec, TokenPair, TokenType};
use crate::password::PasswordHasher;

/// Orchestrates the token codec for session lifecycles.
///
/// Stateless: revocation and session persistence belong to an external
/// store. Refreshing never extends the refresh token's own lifetime.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    /// Token signing and validation.
    codec: Arc<TokenCodec>,
    /// Password verification for the login path.
    password_hasher: Arc<PasswordHasher>,
}

impl SessionIssuer {
    /// Creates a new issuer.
    pub fn new(codec: Arc<TokenCodec>, password_hasher: Arc<PasswordHasher>) -> Self {
        Self {
            codec,
            password_hasher,
        }
    }

    /// Issues an access + refresh pair for an already authenticated identity.
    pub fn issue_session(
        &self,
        identity: &Identity,
        session_id: &SessionId,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<TokenPair> {
        let pair = self.codec.generate_token_pair(identity, session_id, client_ip)?;
        info!(user_id = %identity.id, session_id = %session_id, "Session issued");
        Ok(pair)
    }

    /// Verifies a password and, on success, issues a token pair.
    ///
    /// A wrong password and an unreadable stored hash both surface as
    /// `InvalidCredentials`; the latter is logged for operators.
    pub fn login(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &Identity,
        session_id: &SessionId,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<TokenPair> {
        match self.password_hasher.verify_password(password, stored_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %identity.id, "Login failed: password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            Err(AuthError::HashDecode(reason)) => {
                error!(
                    user_id = %identity.id,
                    %reason,
                    "Login failed: stored password hash is corrupt"
                );
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        }

        self.issue_session(identity, session_id, client_ip)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Validation errors propagate unchanged. The new token uses the refresh
    /// token's session ID and the roles and permissions of `identity` as
    /// supplied now, not as they were at login.
    pub fn refresh_access_token(
        &self,
        refresh_token: &str,
        identity: &Identity,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let claims = self.codec.validate_token(refresh_token)?;
        require_type(&claims, TokenType::Refresh)?;

        if claims.user_id() != identity.id {
            warn!(
                token_user = %claims.user_id(),
                identity_user = %identity.id,
                "Refresh token presented for a different user"
            );
            return Err(AuthError::invalid_token(
                "refresh token subject does not match identity",
            ));
        }

        let session_id = claims.session_id();
        let (token, expires_at) =
            self.codec.generate_access_token(identity, session_id, client_ip)?;
        info!(user_id = %identity.id, %session_id, "Access token refreshed");
        Ok((token, expires_at))
    }

    /// Validates an access token presented on a request.
    pub fn authenticate(&self, access_token: &str) -> AuthResult<Claims> {
        let claims = self.codec.validate_token(access_token)?;
        require_type(&claims, TokenType::Access)?;
        Ok(claims)
    }

    /// Returns the underlying codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
