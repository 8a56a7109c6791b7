//! Token codec: one signing/verification pair sharing keys and claim schema.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};

use complyhub_core::config::AuthConfig;
use complyhub_core::config::auth::{MAX_ACCESS_TTL_MINUTES, MAX_REFRESH_TTL_DAYS};
use complyhub_core::types::{SessionId, UserId};

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;

use super::claims::Claims;
use super::decoder::JwtDecoder;
use super::encoder::{JwtEncoder, TokenPair};
use super::keys::TokenKeys;

/// Issuer, audience, and lifetimes shared by signing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    /// Expected `iss`.
    pub issuer: String,
    /// Expected `aud`.
    pub audience: String,
    /// Access token lifetime.
    pub access_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_ttl: Duration,
    /// Clock-skew tolerance for `nbf`, in seconds.
    pub leeway_seconds: u64,
}

impl TokenSettings {
    /// Reads token settings from auth configuration.
    ///
    /// Lifetimes above the configured maxima are rejected.
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: lifetime(
                "access_token_ttl_minutes",
                config.access_token_ttl_minutes,
                MAX_ACCESS_TTL_MINUTES,
                Duration::try_minutes,
            )?,
            refresh_ttl: lifetime(
                "refresh_token_ttl_days",
                config.refresh_token_ttl_days,
                MAX_REFRESH_TTL_DAYS,
                Duration::try_days,
            )?,
            leeway_seconds: config.clock_skew_leeway_seconds,
        })
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        let config = AuthConfig::default();
        Self {
            issuer: config.issuer,
            audience: config.audience,
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            leeway_seconds: config.clock_skew_leeway_seconds,
        }
    }
}

fn lifetime(
    key: &str,
    value: u64,
    max: u64,
    to_duration: fn(i64) -> Option<Duration>,
) -> AuthResult<Duration> {
    if value == 0 || value > max {
        return Err(AuthError::Configuration(format!(
            "auth.{key} must be between 1 and {max}, got {value}"
        )));
    }
    i64::try_from(value)
        .ok()
        .and_then(to_duration)
        .ok_or_else(|| AuthError::Configuration(format!("auth.{key} is out of range")))
}

/// Signs and verifies session tokens.
///
/// Immutable after construction and cheap to clone; share one instance
/// across all request handlers.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl TokenCodec {
    /// Creates a codec from explicit keys and settings.
    pub fn new(keys: TokenKeys, settings: TokenSettings) -> Self {
        Self {
            decoder: JwtDecoder::new(&keys, &settings),
            encoder: JwtEncoder::new(&keys, settings),
        }
    }

    /// Creates a codec from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let keys = TokenKeys::from_config(config)?;
        Ok(Self::new(keys, TokenSettings::from_config(config)?))
    }

    /// Mints an access token. Returns the token and its expiry.
    pub fn generate_access_token(
        &self,
        identity: &Identity,
        session_id: &SessionId,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        self.encoder.generate_access_token(identity, session_id, client_ip)
    }

    /// Mints a refresh token. Returns the token and its expiry.
    pub fn generate_refresh_token(
        &self,
        user_id: UserId,
        session_id: &SessionId,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        self.encoder.generate_refresh_token(user_id, session_id)
    }

    /// Mints both tokens for one session.
    pub fn generate_token_pair(
        &self,
        identity: &Identity,
        session_id: &SessionId,
        client_ip: Option<IpAddr>,
    ) -> AuthResult<TokenPair> {
        self.encoder.generate_token_pair(identity, session_id, client_ip)
    }

    /// Validates a token of either kind.
    ///
    /// Expired tokens fail with `TokenExpired`; every other rejection is
    /// `InvalidToken`.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        self.decoder.decode_token(token)
    }

    /// Validates a token as of `now`.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        self.decoder.decode_token_at(token, now)
    }
}
