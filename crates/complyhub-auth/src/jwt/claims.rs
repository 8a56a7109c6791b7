//! Claims structure embedded in access and refresh tokens.
//!
//! Registered claims (`iss`, `sub`, `aud`, `exp`) and the token kind are
//! mandatory. Everything else defaults when absent so that verifiers keep
//! accepting tokens minted by newer issuers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use complyhub_core::types::{OrganizationId, SessionId, UserId};

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, fixed per deployment.
    pub iss: String,
    /// Subject, the user ID rendered as a string.
    pub sub: String,
    /// Audience, fixed per deployment.
    pub aud: String,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Not-before timestamp (seconds since epoch).
    #[serde(default)]
    pub nbf: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Random token ID for traceability.
    #[serde(default)]
    pub jti: String,
    /// User the token was issued to.
    #[serde(default)]
    pub user_id: UserId,
    /// User email at issuance.
    #[serde(default)]
    pub email: String,
    /// Role names at issuance. Order carries no meaning.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Tenant organization.
    #[serde(default)]
    pub org_id: OrganizationId,
    /// Denormalized permission names (`resource:action:scope`).
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Session correlating the access/refresh pair.
    #[serde(default)]
    pub sid: SessionId,
    /// Token kind.
    pub token_type: TokenType,
    /// Client IP observed at issuance. Access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

impl TokenType {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Claims {
    /// Returns the user ID.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the session ID.
    pub fn session_id(&self) -> &SessionId {
        &self.sid
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is expired at `now`. The expiry instant itself
    /// counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Returns the remaining TTL in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_payload_defaults_optional_fields() {
        let json = serde_json::json!({
            "iss": "complyhub",
            "sub": "user-1",
            "aud": "complyhub-api",
            "exp": 2_000_000_000_i64,
            "token_type": "refresh",
            "future_claim": {"nested": true}
        });
        let claims: Claims = serde_json::from_value(json).expect("decode");
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert!(claims.roles.is_empty());
        assert!(claims.email.is_empty());
        assert!(claims.sid.is_empty());
        assert!(claims.org_id.is_nil());
        assert_eq!(claims.client_ip, None);
        assert_eq!(claims.iat, 0);
    }

    #[test]
    fn test_missing_token_type_fails() {
        let json = serde_json::json!({
            "iss": "complyhub",
            "sub": "user-1",
            "aud": "complyhub-api",
            "exp": 2_000_000_000_i64
        });
        assert!(serde_json::from_value::<Claims>(json).is_err());
    }

    #[test]
    fn test_unknown_token_type_fails() {
        let json = serde_json::json!({
            "iss": "complyhub",
            "sub": "user-1",
            "aud": "complyhub-api",
            "exp": 2_000_000_000_i64,
            "token_type": "id"
        });
        assert!(serde_json::from_value::<Claims>(json).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let json = serde_json::json!({
            "iss": "i", "sub": "s", "aud": "a", "exp": 1_000, "token_type": "access"
        });
        let claims: Claims = serde_json::from_value(json).expect("decode");
        let before = DateTime::from_timestamp(999, 0).expect("ts");
        let at = DateTime::from_timestamp(1_000, 0).expect("ts");
        assert!(!claims.is_expired_at(before));
        assert!(claims.is_expired_at(at));
        assert_eq!(claims.remaining_ttl_seconds(), 0);
    }
}
