//! Token validation.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};

use super::claims::{Claims, TokenType};
use super::codec::TokenSettings;
use super::keys::TokenKeys;

/// Registered claims every token must carry.
const REQUIRED_CLAIMS: [&str; 4] = ["exp", "iss", "aud", "sub"];

/// Validates tokens against one algorithm, issuer, and audience.
#[derive(Clone)]
pub struct JwtDecoder {
    /// Verification key.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Tolerance applied to `nbf`.
    leeway_seconds: i64,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder.
    ///
    /// Only the key's algorithm is accepted; a token whose header names any
    /// other algorithm is rejected before its signature or claims are read.
    pub fn new(keys: &TokenKeys, settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(keys.algorithm);
        // Expiry and not-before are checked against an explicit clock below.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);

        Self {
            decoding_key: keys.decoding.clone(),
            validation,
            leeway_seconds: settings.leeway_seconds as i64,
        }
    }

    /// Validates a token of either kind at the current time.
    pub fn decode_token(&self, token: &str) -> AuthResult<Claims> {
        self.decode_token_at(token, Utc::now())
    }

    /// Validates a token of either kind at `now`.
    pub fn decode_token_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let err = map_jwt_error(e.kind());
                warn!(error = %err, "Rejected token");
                err
            })?;
        let claims = token_data.claims;

        if claims.is_expired_at(now) {
            debug!(jti = %claims.jti, token_type = %claims.token_type, "Token expired");
            return Err(AuthError::TokenExpired);
        }
        if claims.nbf > now.timestamp() + self.leeway_seconds {
            warn!(jti = %claims.jti, nbf = claims.nbf, "Token used before its not-before time");
            return Err(AuthError::invalid_token("token is not yet valid"));
        }

        debug!(
            user_id = %claims.user_id,
            session_id = %claims.sid,
            token_type = %claims.token_type,
            "Validated token"
        );
        Ok(claims)
    }
}

/// Fails with `WrongTokenType` unless `claims` is of `expected` kind.
pub(crate) fn require_type(claims: &Claims, expected: TokenType) -> AuthResult<()> {
    if claims.token_type != expected {
        warn!(
            jti = %claims.jti,
            expected = %expected,
            actual = %claims.token_type,
            "Token of the wrong kind presented"
        );
        return Err(AuthError::WrongTokenType {
            expected,
            actual: claims.token_type,
        });
    }
    Ok(())
}

fn map_jwt_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
            AuthError::invalid_token("unexpected signing algorithm")
        }
        ErrorKind::InvalidSignature => AuthError::invalid_token("invalid signature"),
        ErrorKind::InvalidIssuer => AuthError::invalid_token("issuer mismatch"),
        ErrorKind::InvalidAudience => AuthError::invalid_token("audience mismatch"),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::invalid_token(format!("missing required claim '{claim}'"))
        }
        ErrorKind::InvalidToken => AuthError::invalid_token("malformed token"),
        ErrorKind::Json(e) => AuthError::invalid_token(format!("malformed claims: {e}")),
        other => AuthError::invalid_token(format!("token validation failed: {other:?}")),
    }
}
