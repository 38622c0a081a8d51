//! Session-level handlers: health and feature flags

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{get_user_email, AppState};

/// Response for the /api/health endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether the bookkeeping backend answered its health check
    pub backend: bool,
}

/// GET /api/health - Server and backend health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.backend.health_check().await,
    })
}

/// Response for the /api/features endpoint
#[derive(Serialize)]
pub struct FeaturesResponse {
    pub user: String,
    /// Whether the user is on the beta allow-list
    pub beta: bool,
}

/// GET /api/features - Feature flags for the current user
pub async fn get_features(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<FeaturesResponse> {
    let user = get_user_email(&headers);
    let beta = state.access.is_beta_user(&user);
    Json(FeaturesResponse { user, beta })
}
