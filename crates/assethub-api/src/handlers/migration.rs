//! Legacy layout migration handlers.

use axum::Json;
use axum::extract::{Query, State};

use assethub_core::error::AppError;
use assethub_entity::migration::MigrationReport;

use crate::dto::request::ActorParams;
use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// POST /asset/migrate/preview
pub async fn preview(
    State(state): State<AppState>,
    Query(actor): Query<ActorParams>,
) -> Result<Json<ApiResponse<MigrationReport>>, AppError> {
    let report = state.migrator.preview(actor.actor_id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /asset/migrate/execute
pub async fn execute(
    State(state): State<AppState>,
    Query(actor): Query<ActorParams>,
) -> Result<Json<ApiResponse<MigrationReport>>, AppError> {
    let report = state.migrator.execute(actor.actor_id).await?;
    Ok(Json(ApiResponse::ok(report)))
}
