use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use chirpy_types::api::{LoginRequest, RefreshResponse};

use crate::error::ApiError;
use crate::middleware::BearerToken;
use crate::service::ChirpyService;

pub type AppState = Arc<ChirpyService>;

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.login(&req.email, &req.password).await?;
    Ok(Json(session))
}

pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.refresh(&token).await?;
    Ok(Json(RefreshResponse { token }))
}

pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    state.revoke(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
