//! Token creation with configurable signing and TTL.

use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tracing::{debug, warn};

use complyhub_core::types::{SessionId, UserId};

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;

use super::claims::{Claims, TokenType};
use super::codec::TokenSettings;
use super::keys::TokenKeys;

/// Size of the random part of a token ID, in bytes.
const TOKEN_ID_BYTES: usize = 16;

/// Disambiguates fallback token IDs minted within the same nanosecond.
static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// Signing key; `None` for verify-only deployments.
    encoding_key: Option<EncodingKey>,
    /// Header algorithm.
    algorithm: Algorithm,
    /// Issuer, audience, and lifetimes.
    settings: TokenSettings,
}

impl fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &self.algorithm)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder.
    pub fn new(keys: &TokenKeys, settings: TokenSettings) -> Self {
        Self {
            encoding_key: keys.encoding.clone(),
            algorithm: keys.algorithm,
            settings,
        }
    }

    /// Mints an access token carrying the identity's roles and permissions.
    pub fn generate_access_token(
        &self,
        identity: &Identity,
        session_id: &SessionId,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = expiry_after(now, self.settings.access_ttl)?;

        let claims = Claims {
            iss: self.settings.issuer.clone(),
            sub: identity.id.to_string(),
            aud: self.settings.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            jti: generate_token_id(),
            user_id: identity.id,
            email: identity.email.clone(),
            roles: identity.roles.clone(),
            org_id: identity.organization_id,
            permissions: identity.permissions.clone(),
            sid: session_id.clone(),
            token_type: TokenType::Access,
            client_ip: client_ip.map(|ip| ip.to_string()),
        };

        let token = self.sign(&claims)?;
        debug!(user_id = %identity.id, %session_id, jti = %claims.jti, "Issued access token");
        Ok((token, expiry(&claims)))
    }

    /// Mints a refresh token. Carries no roles or permissions.
    pub fn generate_refresh_token(
        &self,
        user_id: UserId,
        session_id: &SessionId,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = expiry_after(now, self.settings.refresh_ttl)?;

        let claims = Claims {
            iss: self.settings.issuer.clone(),
            sub: user_id.to_string(),
            aud: self.settings.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            jti: generate_token_id(),
            user_id,
            email: String::new(),
            roles: Vec::new(),
            org_id: Default::default(),
            permissions: Vec::new(),
            sid: session_id.clone(),
            token_type: TokenType::Refresh,
            client_ip: None,
        };

        let token = self.sign(&claims)?;
        debug!(%user_id, %session_id, jti = %claims.jti, "Issued refresh token");
        Ok((token, expiry(&claims)))
    }

    /// Generates a new access + refresh token pair for one session.
    pub fn generate_token_pair(
        &self,
        identity: &Identity,
        session_id: &SessionId,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<TokenPair> {
        let (access_token, access_expires_at) =
            self.generate_access_token(identity, session_id, client_ip)?;
        let (refresh_token, refresh_expires_at) =
            self.generate_refresh_token(identity.id, session_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    fn sign(&self, claims: &Claims) -> AuthResult<String> {
        let key = self.encoding_key.as_ref().ok_or_else(|| {
            AuthError::TokenEncoding("no signing key configured (verify-only keys)".to_string())
        })?;

        encode(&Header::new(self.algorithm), claims, key).map_err(|e| {
            AuthError::TokenEncoding(format!("failed to encode {} token: {e}", claims.token_type))
        })
    }
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> AuthResult<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AuthError::TokenEncoding("token lifetime overflows the clock".to_string()))
}

/// Expiry truncated to whole seconds, matching what the token carries.
fn expiry(claims: &Claims) -> DateTime<Utc> {
    claims.expires_at()
}

/// Generates a hex token ID from the OS CSPRNG.
pub(crate) fn generate_token_id() -> String {
    token_id_from(|buf| OsRng.try_fill_bytes(buf))
}

/// Builds a token ID from `fill`, falling back to a clock-derived ID when
/// the entropy source fails. Issuing a token must never fail on this.
pub(crate) fn token_id_from<E, F>(fill: F) -> String
where
    E: fmt::Display,
    F: FnOnce(&mut [u8]) -> Result<(), E>,
{
    let mut bytes = [0u8; TOKEN_ID_BYTES];
    match fill(&mut bytes) {
        Ok(()) => hex::encode(bytes),
        Err(e) => {
            warn!(error = %e, "Secure randomness unavailable, using clock-derived token ID");
            fallback_token_id()
        }
    }
}

fn fallback_token_id() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
    let seq = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{nanos:016x}{seq:016x}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_token_id_is_32_hex_chars() {
        let id = generate_token_id();
        assert_eq!(id.len(), TOKEN_ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_ids_are_unique() {
        let ids: HashSet<String> = (0..256).map(|_| generate_token_id()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn test_fallback_when_entropy_fails() {
        let a = token_id_from(|_| Err("entropy source unavailable"));
        let b = token_id_from(|_| Err("entropy source unavailable"));
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_overflowing_lifetime_is_an_error() {
        let keys = TokenKeys::hmac(b"0123456789abcdef0123456789abcdef", Algorithm::HS256)
            .expect("keys");
        let encoder = JwtEncoder::new(
            &keys,
            TokenSettings {
                refresh_ttl: Duration::days(1_000_000_000),
                ..TokenSettings::default()
            },
        );
        let result = encoder.generate_refresh_token(UserId::new(), &SessionId::from("s-1"));
        assert!(matches!(result, Err(AuthError::TokenEncoding(_))));
    }

    #[test]
    fn test_verify_only_keys_cannot_sign() {
        let keys = TokenKeys::hmac(b"0123456789abcdef0123456789abcdef", Algorithm::HS256)
            .map(|mut keys| {
                keys.encoding = None;
                keys
            })
            .expect("keys");
        let encoder = JwtEncoder::new(&keys, TokenSettings::default());
        let result = encoder.generate_refresh_token(UserId::new(), &SessionId::from("s-1"));
        assert!(matches!(result, Err(AuthError::TokenEncoding(_))));
    }
}
