use axum::{
    Router,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::{chirps, users, webhooks};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/healthz", get(health))
        .route("/api/users", post(users::create_user).put(users::update_user))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route("/api/chirps", post(chirps::create_chirp).get(chirps::list_chirps))
        .route(
            "/api/chirps/{chirp_id}",
            get(chirps::get_chirp).delete(chirps::delete_chirp),
        )
        .route("/api/polka/webhooks", post(webhooks::polka_webhook))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
