use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use chirpy_types::api::{UserCredentialsRequest, UserResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::BearerToken;

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserCredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.create_user(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<UserCredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.update_user(&token, &req.email, &req.password).await?;
    Ok(Json(UserResponse::from(user)))
}
