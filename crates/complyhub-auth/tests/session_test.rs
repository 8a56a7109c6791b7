//! Integration tests for session issuance and refresh.

mod helpers;

use complyhub_auth::error::INVALID_CREDENTIALS_MESSAGE;
use complyhub_auth::{AuthError, Identity, TokenType};
use complyhub_core::types::{SessionId, UserId};

#[test]
fn test_login_success_issues_pair_for_session() {
    let issuer = helpers::issuer();
    let hash = helpers::fast_hasher()
        .hash_password("correct horse battery staple")
        .expect("hash");
    let identity = helpers::auditor();

    let pair = issuer
        .login(
            "correct horse battery staple",
            &hash,
            &identity,
            &helpers::session(),
            helpers::client_ip(),
        )
        .expect("login");

    let access = issuer.authenticate(&pair.access_token).expect("access");
    let refresh = issuer.codec().validate_token(&pair.refresh_token).expect("refresh");
    assert_eq!(access.sid, refresh.sid);
    assert_eq!(refresh.token_type, TokenType::Refresh);
    assert!(pair.refresh_expires_at > pair.access_expires_at);
}

#[test]
fn test_login_failures_look_identical() {
    let issuer = helpers::issuer();
    let identity = helpers::auditor();
    let hash = helpers::fast_hasher()
        .hash_password("correct horse battery staple")
        .expect("hash");

    let wrong_password = issuer
        .login("wrong horse battery staple", &hash, &identity, &helpers::session(), None)
        .unwrap_err();
    let corrupt_hash = issuer
        .login(
            "correct horse battery staple",
            "$argon2id$not-a-hash",
            &identity,
            &helpers::session(),
            None,
        )
        .unwrap_err();

    assert_eq!(wrong_password, AuthError::InvalidCredentials);
    assert_eq!(corrupt_hash, AuthError::InvalidCredentials);
    assert_eq!(wrong_password.public_message(), INVALID_CREDENTIALS_MESSAGE);
}

#[test]
fn test_refresh_reuses_session_and_fresh_roles() {
    let issuer = helpers::issuer();
    let identity = helpers::auditor();
    let session = SessionId::from("sess-refresh");
    let pair = issuer
        .issue_session(&identity, &session, helpers::client_ip())
        .expect("pair");

    let promoted = Identity {
        roles: vec!["audit_manager".to_string()],
        permissions: vec!["assignments:*:team".to_string()],
        ..identity.clone()
    };
    let (token, expires_at) = issuer
        .refresh_access_token(&pair.refresh_token, &promoted, None)
        .expect("refresh");

    let claims = issuer.authenticate(&token).expect("claims");
    assert_eq!(claims.sid, session);
    assert_eq!(claims.roles, vec!["audit_manager".to_string()]);
    assert_eq!(claims.permissions, promoted.permissions);
    assert_eq!(claims.client_ip, None);
    assert_eq!(claims.exp, expires_at.timestamp());
}

#[test]
fn test_refresh_does_not_extend_refresh_token() {
    let issuer = helpers::issuer();
    let identity = helpers::auditor();
    let pair = issuer
        .issue_session(&identity, &helpers::session(), None)
        .expect("pair");
    let before = issuer.codec().validate_token(&pair.refresh_token).expect("claims");

    issuer
        .refresh_access_token(&pair.refresh_token, &identity, None)
        .expect("refresh");

    let after = issuer.codec().validate_token(&pair.refresh_token).expect("claims");
    assert_eq!(before.exp, after.exp);
}

#[test]
fn test_refresh_with_access_token_is_wrong_type() {
    let issuer = helpers::issuer();
    let identity = helpers::auditor();
    let pair = issuer
        .issue_session(&identity, &helpers::session(), None)
        .expect("pair");

    let err = issuer
        .refresh_access_token(&pair.access_token, &identity, None)
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::WrongTokenType {
            expected: TokenType::Refresh,
            actual: TokenType::Access,
        }
    );
}

#[test]
fn test_refresh_token_not_accepted_as_access() {
    let issuer = helpers::issuer();
    let pair = issuer
        .issue_session(&helpers::auditor(), &helpers::session(), None)
        .expect("pair");

    let err = issuer.authenticate(&pair.refresh_token).unwrap_err();
    assert!(matches!(
        err,
        AuthError::WrongTokenType {
            expected: TokenType::Access,
            actual: TokenType::Refresh,
        }
    ));
}

#[test]
fn test_refresh_propagates_validation_error() {
    let issuer = helpers::issuer();
    let err = issuer
        .refresh_access_token("not.a.token", &helpers::auditor(), None)
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[test]
fn test_refresh_for_another_user_rejected() {
    let issuer = helpers::issuer();
    let identity = helpers::auditor();
    let pair = issuer
        .issue_session(&identity, &helpers::session(), None)
        .expect("pair");

    let impostor = Identity {
        id: UserId::new(),
        ..identity
    };
    let err = issuer
        .refresh_access_token(&pair.refresh_token, &impostor, None)
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)));
}
