//! Signed bearer tokens.
//!
//! Access and refresh tokens share one HMAC secret and are told apart by the
//! `iss` claim. Access tokens are never looked up in the store; refresh tokens
//! are additionally checked against the revocation ledger by the caller.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use chirpy_types::api::{Claims, TokenKind};
use chirpy_types::models::UserId;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 180 * 24 * 60 * 60;

pub fn access_token_ttl() -> Duration {
    Duration::seconds(ACCESS_TOKEN_TTL_SECS)
}

pub fn refresh_token_ttl() -> Duration {
    Duration::seconds(REFRESH_TOKEN_TTL_SECS)
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("expected {expected} token, got {found}")]
    WrongKind { expected: TokenKind, found: TokenKind },

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Sign a token for `user_id` that expires `ttl` from now.
pub fn issue(
    user_id: UserId,
    secret: &str,
    ttl: Duration,
    kind: TokenKind,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        iss: kind,
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)
}

/// Check signature, expiry and kind. Returns the subject.
pub fn validate(token: &str, secret: &str, expected: TokenKind) -> Result<String, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        _ => TokenError::Malformed,
    })?;

    if data.claims.iss != expected {
        return Err(TokenError::WrongKind {
            expected,
            found: data.claims.iss,
        });
    }

    Ok(data.claims.sub)
}

/// Mint a fresh access token from a refresh token. The refresh token stays
/// usable until it expires or is revoked.
pub fn rotate(refresh_token: &str, secret: &str) -> Result<String, TokenError> {
    let subject = validate(refresh_token, secret, TokenKind::Refresh)?;
    let user_id = parse_user_id(&subject)?;
    issue(user_id, secret, access_token_ttl(), TokenKind::Access)
}

pub fn parse_user_id(subject: &str) -> Result<UserId, TokenError> {
    subject
        .parse::<UserId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(TokenError::Malformed)
}
