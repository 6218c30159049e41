use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::error::{ApiError, AuthFailure};

/// Raw token from `Authorization: Bearer <token>`. Validation is left to the
/// workflow, which knows whether an access or a refresh token is expected.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Raw key from `Authorization: ApiKey <key>`.
#[derive(Debug, Clone)]
pub struct ApiKey(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = authorization(&parts.headers, "Bearer")?;
        Ok(Self(token.to_string()))
    }
}

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = authorization(&parts.headers, "ApiKey").map_err(|e| match e {
            AuthFailure::MissingCredentials => AuthFailure::MissingApiKey,
            other => other,
        })?;
        Ok(Self(key.to_string()))
    }
}

/// Extract the credential following `scheme` in the Authorization header.
pub fn authorization<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, AuthFailure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthFailure::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthFailure::MalformedHeader)?;

    let (found, credential) = value
        .split_once(' ')
        .ok_or(AuthFailure::MalformedHeader)?;
    if found != scheme || credential.is_empty() {
        return Err(AuthFailure::MalformedHeader);
    }
    Ok(credential)
}
