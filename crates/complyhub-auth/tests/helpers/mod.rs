//! Shared fixtures for auth integration tests.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use jsonwebtoken::Algorithm;

use complyhub_auth::{
    HashCost, Identity, PasswordHasher, SessionIssuer, TokenCodec, TokenKeys, TokenSettings,
};
use complyhub_core::types::{OrganizationId, SessionId, UserId};

/// HMAC secret used by every test codec.
pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

/// Ed25519 key pair for asymmetric signing tests.
pub const ED25519_PRIVATE_PEM: &str = include_str!("../fixtures/ed25519_private.pem");
pub const ED25519_PUBLIC_PEM: &str = include_str!("../fixtures/ed25519_public.pem");

/// A hasher cheap enough to run hundreds of times per test.
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_cost(HashCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid test cost")
}

/// HS256 codec with default issuer, audience, and lifetimes.
pub fn codec() -> TokenCodec {
    codec_with(TokenSettings::default())
}

/// HS256 codec with custom settings.
pub fn codec_with(settings: TokenSettings) -> TokenCodec {
    let keys = TokenKeys::hmac(TEST_SECRET, Algorithm::HS256).expect("test keys");
    TokenCodec::new(keys, settings)
}

/// Session issuer over the test codec and fast hasher.
pub fn issuer() -> SessionIssuer {
    SessionIssuer::new(Arc::new(codec()), Arc::new(fast_hasher()))
}

/// An auditor in a fresh organization.
pub fn auditor() -> Identity {
    Identity::new(UserId::new(), "auditor@example.com", OrganizationId::new())
        .with_role("auditor")
        .with_permissions(["controls:read:organization", "evidence:read:organization"])
}

pub fn session() -> SessionId {
    SessionId::from("sess-0001")
}

pub fn client_ip() -> Option<IpAddr> {
    Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)))
}
