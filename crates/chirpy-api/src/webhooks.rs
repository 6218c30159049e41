use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use chirpy_types::api::WebhookRequest;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::ApiKey;

/// Payment provider callback. Authenticated by a static key, not a user token.
/// The key is checked before the body is looked at.
pub async fn polka_webhook(
    State(state): State<AppState>,
    ApiKey(key): ApiKey,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    state.verify_api_key(&key)?;
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    state.upgrade_user(&key, &req.event, req.data.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
