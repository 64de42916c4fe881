//! Health check handler.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;

use assethub_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let cache_ok = state.cache.health_check().await.unwrap_or(false);
    let storage: BTreeMap<String, bool> = state.storage.health_check_all().await.into_iter().collect();
    let healthy = cache_ok && storage.values().all(|ok| *ok);

    Json(ApiResponse::ok(HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: if cache_ok { "connected" } else { "unavailable" }.to_string(),
        storage,
    }))
}
