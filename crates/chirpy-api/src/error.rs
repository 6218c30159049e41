use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use chirpy_db::StoreError;

use crate::filter::FilterError;
use crate::tokens::TokenError;

/// Why a caller was not authenticated. All variants map to 401; they are kept
/// apart so logs can tell them apart.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("no credentials in request")]
    MissingCredentials,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("refresh token is revoked")]
    Revoked,

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("no API key in request")]
    MissingApiKey,

    #[error("API key is invalid")]
    InvalidApiKey,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Unauthorized(#[from] AuthFailure),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(AuthFailure::MissingCredentials) => "Couldn't find JWT".into(),
            Self::Unauthorized(AuthFailure::MalformedHeader) => {
                "Malformed authorization header".into()
            }
            Self::Unauthorized(AuthFailure::InvalidToken(_)) => "Couldn't validate JWT".into(),
            Self::Unauthorized(AuthFailure::Revoked) => "Refresh token is revoked".into(),
            Self::Unauthorized(AuthFailure::InvalidCredentials) => {
                "Incorrect email or password".into()
            }
            Self::Unauthorized(AuthFailure::MissingApiKey) => "Couldn't find api key".into(),
            Self::Unauthorized(AuthFailure::InvalidApiKey) => "API key is invalid".into(),
            Self::Storage(_) | Self::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => Self::NotFound(format!("Couldn't find {entity}")),
            StoreError::AlreadyExists { entity } => Self::Conflict(format!("The {entity} already exists")),
            StoreError::AuthorMismatch { .. } => {
                Self::Forbidden("You can't delete this chirp".into())
            }
            other => Self::Storage(other),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => Self::Internal(format!("token signing failed: {e}")),
            other => Self::Unauthorized(AuthFailure::InvalidToken(other)),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Responding with {}: {}", status, self);
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
