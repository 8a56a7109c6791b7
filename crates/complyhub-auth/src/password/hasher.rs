//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use complyhub_core::config::AuthConfig;

use crate::error::{AuthError, AuthResult};

/// PHC algorithm identifier written into every hash.
const ALGORITHM_ID: &str = "argon2id";

/// Work factor of an Argon2id hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCost {
    /// Memory size in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl HashCost {
    /// Reads the configured cost.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            memory_kib: config.password_hash_memory_kib,
            iterations: config.password_hash_cost,
            parallelism: config.password_hash_parallelism,
        }
    }

    fn params(&self) -> AuthResult<Params> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AuthError::Hashing(format!("invalid Argon2 parameters: {e}")))
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}

/// Handles password hashing and verification using Argon2id.
///
/// Holds only immutable configuration; share freely across threads. Hashing
/// is CPU-heavy, so async callers should run it on a blocking
/// worker.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Cost used for new hashes.
    cost: HashCost,
    /// Validated Argon2 parameters for `cost`.
    params: Params,
    /// Minimum plaintext length in characters.
    min_length: usize,
    /// Maximum plaintext length in characters.
    max_length: usize,
}

impl PasswordHasher {
    /// Creates a hasher from auth configuration.
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let cost = HashCost::from_config(config);
        Ok(Self {
            params: cost.params()?,
            cost,
            min_length: config.password_min_length,
            max_length: config.password_max_length,
        })
    }

    /// Creates a hasher with an explicit cost and the default length policy.
    pub fn with_cost(cost: HashCost) -> AuthResult<Self> {
        let defaults = AuthConfig::default();
        Ok(Self {
            params: cost.params()?,
            cost,
            min_length: defaults.password_min_length,
            max_length: defaults.password_max_length,
        })
    }

    /// Returns the cost applied to new hashes.
    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    ///
    /// Length is checked before any hashing work is done.
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        self.check_length(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(false)` on mismatch. Errors only when the stored hash
    /// itself is unusable. Plaintexts longer than the maximum length can
    /// never have been hashed, so they are refused without running Argon2.
    pub fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = parse_hash(hash)?;

        if password.chars().nth(self.max_length).is_some() {
            debug!(max_length = self.max_length, "Oversized password refused before verification");
            return Ok(false);
        }

        // Parameters come from the stored hash, not from `self.cost`.
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "Stored password hash failed to verify structurally");
                Err(AuthError::HashDecode(e.to_string()))
            }
        }
    }

    /// Extracts the work factor from a stored hash.
    pub fn get_hash_cost(&self, hash: &str) -> AuthResult<HashCost> {
        hash_cost(hash)
    }

    /// Whether a stored hash was produced with a cost other than the current one.
    pub fn needs_rehash(&self, hash: &str) -> AuthResult<bool> {
        let stored = hash_cost(hash)?;
        let stale = stored != self.cost;
        if stale {
            debug!(?stored, current = ?self.cost, "Password hash cost is out of date");
        }
        Ok(stale)
    }

    fn check_length(&self, password: &str) -> AuthResult<()> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(AuthError::WeakPassword(format!(
                "must be at least {} characters long",
                self.min_length
            )));
        }
        if length > self.max_length {
            return Err(AuthError::WeakPassword(format!(
                "must be at most {} characters long",
                self.max_length
            )));
        }
        Ok(())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

/// Decodes the work factor of a stored hash without needing a hasher.
pub fn hash_cost(hash: &str) -> AuthResult<HashCost> {
    let parsed = parse_hash(hash)?;
    let params = Params::try_from(&parsed)
        .map_err(|e| AuthError::HashDecode(format!("invalid parameters: {e}")))?;

    Ok(HashCost {
        memory_kib: params.m_cost(),
        iterations: params.t_cost(),
        parallelism: params.p_cost(),
    })
}

fn parse_hash(hash: &str) -> AuthResult<PasswordHash<'_>> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "Stored password hash is not a valid PHC string");
        AuthError::HashDecode(format!("invalid PHC string: {e}"))
    })?;

    if parsed.algorithm.as_str() != ALGORITHM_ID {
        error!(algorithm = %parsed.algorithm, "Stored password hash uses an unexpected algorithm");
        return Err(AuthError::HashDecode(format!(
            "unexpected algorithm '{}'",
            parsed.algorithm
        )));
    }
    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(AuthError::HashDecode("missing salt or digest".to_string()));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::with_cost(HashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("valid params")
    }

    #[test]
    fn test_short_password_rejected() {
        let err = cheap().hash_password("short").unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[test]
    fn test_boundary_lengths() {
        let hasher = cheap();
        assert!(hasher.hash_password(&"a".repeat(11)).is_err());
        assert!(hasher.hash_password(&"a".repeat(12)).is_ok());
        assert!(hasher.hash_password(&"a".repeat(128)).is_ok());
        assert!(matches!(
            hasher.hash_password(&"a".repeat(129)),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_oversized_password_never_matches() {
        let hasher = cheap();
        let at_limit = "b".repeat(128);
        let hash = hasher.hash_password(&at_limit).expect("hash");
        assert!(hasher.verify_password(&at_limit, &hash).expect("verify"));

        let oversized = format!("{at_limit}b");
        assert!(!hasher.verify_password(&oversized, &hash).expect("verify"));
        let huge = "b".repeat(4 * 1024 * 1024);
        assert!(!hasher.verify_password(&huge, &hash).expect("verify"));
        assert!(matches!(
            hasher.verify_password(&huge, "$argon2id$corrupt"),
            Err(AuthError::HashDecode(_))
        ));
    }

    #[test]
    fn test_length_counts_characters() {
        // 12 characters, 36 bytes.
        let password = "日本語のパスワードです。";
        assert_eq!(password.chars().count(), 12);
        assert!(cheap().hash_password(password).is_ok());
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = cheap();
        let a = hasher.hash_password("correct horse battery").expect("hash");
        let b = hasher.hash_password("correct horse battery").expect("hash");
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_mismatch_is_not_an_error() {
        let hasher = cheap();
        let hash = hasher.hash_password("correct horse battery").expect("hash");
        assert!(!hasher.verify_password("wrong horse battery", &hash).expect("verify"));
    }

    #[test]
    fn test_corrupt_hash_is_decode_error() {
        let hasher = cheap();
        let corrupt = [
            "",
            "plaintext",
            "$argon2id$v=19$m=64,t=1,p=1$",
            "$2b$12$abcdefghijklmnopqrstuv",
        ];
        for bad in corrupt {
            let result = hasher.verify_password("anything at all", bad);
            assert!(
                matches!(result, Err(AuthError::HashDecode(_))),
                "expected decode error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        let hasher = cheap();
        let hash = hasher.hash_password("correct horse battery").expect("hash");
        let swapped = hash.replacen("argon2id", "argon2i", 1);
        assert!(matches!(
            hasher.verify_password("correct horse battery", &swapped),
            Err(AuthError::HashDecode(_))
        ));
    }

    #[test]
    fn test_get_hash_cost_and_rehash() {
        let hasher = cheap();
        let hash = hasher.hash_password("correct horse battery").expect("hash");
        let cost = hasher.get_hash_cost(&hash).expect("cost");
        assert_eq!(cost, hasher.cost());
        assert!(!hasher.needs_rehash(&hash).expect("rehash"));

        let stronger = PasswordHasher::with_cost(HashCost {
            iterations: 2,
            ..hasher.cost()
        })
        .expect("valid params");
        assert!(stronger.needs_rehash(&hash).expect("rehash"));
        // Old hashes still verify after a cost bump.
        assert!(stronger.verify_password("correct horse battery", &hash).expect("verify"));
    }

    #[test]
    fn test_default_cost() {
        let cost = HashCost::default();
        assert_eq!(cost.iterations, 12);
        assert_eq!(cost.memory_kib, 19_456);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHasher::with_cost(HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }
}
