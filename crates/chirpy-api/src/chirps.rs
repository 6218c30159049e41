use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use chirpy_types::api::{CreateChirpRequest, SortOrder};
use chirpy_types::models::{ChirpId, UserId};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::BearerToken;

#[derive(Debug, Deserialize)]
pub struct ChirpQuery {
    pub author_id: Option<UserId>,
    /// `asc` (default) or `desc`, by chirp id.
    pub sort: Option<String>,
}

pub async fn create_chirp(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = state.create_chirp(&token, &req.body).await?;
    Ok((StatusCode::CREATED, Json(chirp)))
}

pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sort = SortOrder::from_param(query.sort.as_deref());
    let chirps = state.list_chirps(query.author_id, sort).await?;
    Ok(Json(chirps))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<ChirpId>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = state.get_chirp(chirp_id).await?;
    Ok(Json(chirp))
}

pub async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<ChirpId>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    state.delete_chirp(&token, chirp_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
