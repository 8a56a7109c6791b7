//! Authentication configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder shipped in the default configuration; never accepted at runtime.
pub const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Minimum accepted length of an HMAC signing secret in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted access token lifetime (one day).
pub const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;

/// Longest accepted refresh token lifetime.
pub const MAX_REFRESH_TTL_DAYS: u64 = 365;

/// Authentication and credential configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HMAC token signing.
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
    /// Token signing algorithm: `HS256`, `HS384`, `HS512` or `EdDSA`.
    #[serde(default = "default_signing_algorithm")]
    pub signing_algorithm: String,
    /// PEM-encoded Ed25519 private key, required to issue `EdDSA` tokens.
    #[serde(default)]
    pub signing_private_key_pem: Option<String>,
    /// PEM-encoded Ed25519 public key, required to verify `EdDSA` tokens.
    #[serde(default)]
    pub verification_public_key_pem: Option<String>,
    /// Token issuer (`iss`), fixed per deployment.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Token audience (`aud`), fixed per deployment.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Tolerance for issuer clock skew, applied to `nbf` only.
    #[serde(default = "default_leeway")]
    pub clock_skew_leeway_seconds: u64,
    /// Argon2id iteration count.
    #[serde(default = "default_hash_cost")]
    pub password_hash_cost: u32,
    /// Argon2id memory size in KiB.
    #[serde(default = "default_hash_memory")]
    pub password_hash_memory_kib: u32,
    /// Argon2id lane count.
    #[serde(default = "default_hash_parallelism")]
    pub password_hash_parallelism: u32,
    /// Minimum password length in characters.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length in characters.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Maximum failed login attempts before lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// Account lockout duration in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
}

/// Account lockout constants. Bookkeeping of failed attempts lives with the
/// caller; this only carries the policy values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutPolicy {
    /// Failed attempts tolerated before the account is locked.
    pub max_failed_attempts: u32,
    /// How long a lock lasts, in minutes.
    pub lockout_duration_minutes: u64,
}

impl AuthConfig {
    /// Checks invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        let hmac = self.signing_algorithm.to_ascii_uppercase().starts_with("HS");
        if hmac {
            if self.signing_secret == PLACEHOLDER_SECRET {
                return Err(AppError::configuration(
                    "auth.signing_secret still holds the placeholder value",
                ));
            }
            if self.signing_secret.len() < MIN_SECRET_BYTES {
                return Err(AppError::configuration(format!(
                    "auth.signing_secret must be at least {MIN_SECRET_BYTES} bytes"
                )));
            }
        } else if self.verification_public_key_pem.is_none() {
            return Err(AppError::configuration(format!(
                "auth.verification_public_key_pem is required for {}",
                self.signing_algorithm
            )));
        }

        if self.issuer.is_empty() || self.audience.is_empty() {
            return Err(AppError::configuration(
                "auth.issuer and auth.audience must not be empty",
            ));
        }
        if self.password_min_length > self.password_max_length {
            return Err(AppError::configuration(
                "auth.password_min_length exceeds auth.password_max_length",
            ));
        }
        if self.access_token_ttl_minutes == 0 || self.refresh_token_ttl_days == 0 {
            return Err(AppError::configuration("token lifetimes must be non-zero"));
        }
        if self.access_token_ttl_minutes > MAX_ACCESS_TTL_MINUTES {
            return Err(AppError::configuration(format!(
                "auth.access_token_ttl_minutes must not exceed {MAX_ACCESS_TTL_MINUTES}"
            )));
        }
        if self.refresh_token_ttl_days > MAX_REFRESH_TTL_DAYS {
            return Err(AppError::configuration(format!(
                "auth.refresh_token_ttl_days must not exceed {MAX_REFRESH_TTL_DAYS}"
            )));
        }
        Ok(())
    }

    /// Returns the lockout policy constants.
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_failed_attempts: self.max_failed_attempts,
            lockout_duration_minutes: self.lockout_duration_minutes,
        }
    }

    /// Returns a copy safe to print, with key material masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.signing_secret = "***".to_string();
        copy.signing_private_key_pem = copy.signing_private_key_pem.map(|_| "***".to_string());
        copy
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_algorithm", &self.signing_algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("password_hash_cost", &self.password_hash_cost)
            .finish_non_exhaustive()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: default_signing_secret(),
            signing_algorithm: default_signing_algorithm(),
            signing_private_key_pem: None,
            verification_public_key_pem: None,
            issuer: default_issuer(),
            audience: default_audience(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            clock_skew_leeway_seconds: default_leeway(),
            password_hash_cost: default_hash_cost(),
            password_hash_memory_kib: default_hash_memory(),
            password_hash_parallelism: default_hash_parallelism(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout(),
        }
    }
}

fn default_signing_secret() -> String {
    PLACEHOLDER_SECRET.to_string()
}

fn default_signing_algorithm() -> String {
    "HS256".to_string()
}

fn default_issuer() -> String {
    "complyhub".to_string()
}

fn default_audience() -> String {
    "complyhub-api".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_leeway() -> u64 {
    5
}

fn default_hash_cost() -> u32 {
    12
}

fn default_hash_memory() -> u32 {
    19_456
}

fn default_hash_parallelism() -> u32 {
    1
}

fn default_password_min() -> usize {
    12
}

fn default_password_max() -> usize {
    128
}

fn default_max_failed() -> u32 {
    5
}

fn default_lockout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret(secret: &str) -> AuthConfig {
        AuthConfig {
            signing_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        assert!(AuthConfig::default().validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(with_secret("too-short").validate().is_err());
    }

    #[test]
    fn test_strong_secret_accepted() {
        let config = with_secret("0123456789abcdef0123456789abcdef-extra");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_eddsa_requires_public_key() {
        let config = AuthConfig {
            signing_algorithm: "EdDSA".to_string(),
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_length_bounds_rejected() {
        let config = AuthConfig {
            password_min_length: 200,
            ..with_secret("0123456789abcdef0123456789abcdef")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lifetime_upper_bounds() {
        let base = with_secret("0123456789abcdef0123456789abcdef");
        let long_refresh = AuthConfig {
            refresh_token_ttl_days: 1_000_000_000,
            ..base.clone()
        };
        let long_access = AuthConfig {
            access_token_ttl_minutes: MAX_ACCESS_TTL_MINUTES + 1,
            ..base.clone()
        };
        let at_limit = AuthConfig {
            access_token_ttl_minutes: MAX_ACCESS_TTL_MINUTES,
            refresh_token_ttl_days: MAX_REFRESH_TTL_DAYS,
            ..base
        };
        assert!(long_refresh.validate().is_err());
        assert!(long_access.validate().is_err());
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_redacted_masks_secret() {
        let config = with_secret("0123456789abcdef0123456789abcdef");
        assert_eq!(config.redacted().signing_secret, "***");
        assert!(!format!("{config:?}").contains("0123456789abcdef"));
    }

    #[test]
    fn test_lockout_policy_defaults() {
        let policy = AuthConfig::default().lockout_policy();
        assert_eq!(policy.max_failed_attempts, 5);
        assert_eq!(policy.lockout_duration_minutes, 30);
    }
}
