//! Integration tests for password hashing and verification.

mod helpers;

use proptest::prelude::*;

use complyhub_auth::AuthError;
use complyhub_auth::password::{estimate_strength, hash_cost};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        ..ProptestConfig::default()
    })]

    /// Property: any password within the length policy verifies against its own hash.
    #[test]
    fn valid_passwords_round_trip(password in "[ -~]{12,128}") {
        let hasher = helpers::fast_hasher();
        let hash = hasher.hash_password(&password).expect("hash");
        prop_assert!(hasher.verify_password(&password, &hash).expect("verify"));
    }

    /// Property: a different password never verifies.
    #[test]
    fn different_passwords_do_not_verify(
        first in "[a-z]{12,40}",
        second in "[A-Z]{12,40}",
    ) {
        let hasher = helpers::fast_hasher();
        let hash = hasher.hash_password(&first).expect("hash");
        prop_assert!(!hasher.verify_password(&second, &hash).expect("verify"));
    }

    /// Property: out-of-policy lengths are rejected before hashing.
    #[test]
    fn out_of_policy_lengths_rejected(
        short in "[a-z]{0,11}",
        long in "[a-z]{129,200}",
    ) {
        let hasher = helpers::fast_hasher();
        prop_assert!(matches!(hasher.hash_password(&short), Err(AuthError::WeakPassword(_))));
        prop_assert!(matches!(hasher.hash_password(&long), Err(AuthError::WeakPassword(_))));
    }
}

#[test]
fn test_hash_cost_without_hasher() {
    let hasher = helpers::fast_hasher();
    let hash = hasher.hash_password("tr0ub4dor&3-horse").expect("hash");
    let cost = hash_cost(&hash).expect("cost");
    assert_eq!(cost.iterations, 1);
    assert_eq!(cost.memory_kib, 64);
    assert_eq!(cost.parallelism, 1);
}

#[test]
fn test_hash_cost_of_corrupt_hash() {
    assert!(matches!(
        hash_cost("$argon2id$v=19$garbage"),
        Err(AuthError::HashDecode(_))
    ));
}

#[test]
fn test_truncated_digest_is_decode_error_not_mismatch() {
    let hasher = helpers::fast_hasher();
    let hash = hasher.hash_password("tr0ub4dor&3-horse").expect("hash");
    let (prefix, _) = hash.rsplit_once('$').expect("digest separator");
    let result = hasher.verify_password("tr0ub4dor&3-horse", prefix);
    assert!(matches!(result, Err(AuthError::HashDecode(_))));
}

#[test]
fn test_strength_is_advisory_only() {
    let weak = "aaaaaaaaaaaa";
    assert!(!estimate_strength(weak, &[]).is_acceptable());
    assert!(helpers::fast_hasher().hash_password(weak).is_ok());
}
