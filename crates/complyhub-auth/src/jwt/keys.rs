//! Signing and verification key material.

use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use complyhub_core::config::AuthConfig;
use complyhub_core::config::auth::{MIN_SECRET_BYTES, PLACEHOLDER_SECRET};

use crate::error::{AuthError, AuthResult};

/// Key material for one signing algorithm.
///
/// HMAC keys sign and verify with the same secret. Ed25519 keys may be
/// verify-only, for services that accept tokens but never mint them.
#[derive(Clone)]
pub struct TokenKeys {
    /// Algorithm every token must be signed with.
    pub(crate) algorithm: Algorithm,
    /// Absent for verify-only key sets.
    pub(crate) encoding: Option<EncodingKey>,
    pub(crate) decoding: DecodingKey,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithm", &self.algorithm)
            .field("can_sign", &self.encoding.is_some())
            .finish()
    }
}

impl TokenKeys {
    /// Shared-secret keys for an `HS*` algorithm.
    ///
    /// The secret must be at least [`MIN_SECRET_BYTES`] long and must not be
    /// the shipped placeholder.
    pub fn hmac(secret: &[u8], algorithm: Algorithm) -> AuthResult<Self> {
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthError::Configuration(format!(
                "{algorithm:?} is not an HMAC algorithm"
            )));
        }
        if secret == PLACEHOLDER_SECRET.as_bytes() {
            return Err(AuthError::Configuration(
                "signing secret still holds the placeholder value".to_string(),
            ));
        }
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::Configuration(format!(
                "signing secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }

        Ok(Self {
            algorithm,
            encoding: Some(EncodingKey::from_secret(secret)),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    /// Ed25519 key pair from PEM documents.
    pub fn ed25519_pem(private_pem: &[u8], public_pem: &[u8]) -> AuthResult<Self> {
        let encoding = EncodingKey::from_ed_pem(private_pem)
            .map_err(|e| AuthError::Configuration(format!("invalid Ed25519 private key: {e}")))?;
        let mut keys = Self::ed25519_verify_only(public_pem)?;
        keys.encoding = Some(encoding);
        Ok(keys)
    }

    /// Ed25519 public key only. Token generation fails with these keys.
    pub fn ed25519_verify_only(public_pem: &[u8]) -> AuthResult<Self> {
        let decoding = DecodingKey::from_ed_pem(public_pem)
            .map_err(|e| AuthError::Configuration(format!("invalid Ed25519 public key: {e}")))?;
        Ok(Self {
            algorithm: Algorithm::EdDSA,
            encoding: None,
            decoding,
        })
    }

    /// Builds keys from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let algorithm = Algorithm::from_str(&config.signing_algorithm).map_err(|_| {
            AuthError::Configuration(format!(
                "unsupported signing algorithm '{}'",
                config.signing_algorithm
            ))
        })?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Self::hmac(config.signing_secret.as_bytes(), algorithm)
            }
            Algorithm::EdDSA => {
                let public = config.verification_public_key_pem.as_deref().ok_or_else(|| {
                    AuthError::Configuration("verification_public_key_pem is not set".to_string())
                })?;
                match config.signing_private_key_pem.as_deref() {
                    Some(private) => Self::ed25519_pem(private.as_bytes(), public.as_bytes()),
                    None => Self::ed25519_verify_only(public.as_bytes()),
                }
            }
            other => Err(AuthError::Configuration(format!(
                "signing algorithm {other:?} is not supported"
            ))),
        }
    }

    /// Algorithm tokens are signed and verified with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Whether these keys can mint tokens.
    pub fn can_sign(&self) -> bool {
        self.encoding.is_some()
    }
}
