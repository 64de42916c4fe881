//! Upload type-rule administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use assethub_core::error::AppError;
use assethub_entity::type_rule::TypeRule;

use crate::dto::request::TypeRuleRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

fn rule_not_found(id: i64) -> AppError {
    AppError::not_found(format!("File type rule {id} not found"))
}

/// GET /asset-file-types
pub async fn list_all(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<TypeRule>>>, AppError> {
    let rules = state.type_rules.list_all().await?;
    Ok(Json(ApiResponse::ok(rules)))
}

/// GET /asset-file-types/enabled
pub async fn list_enabled(State(state): State<AppState>) -> Json<ApiResponse<Vec<TypeRule>>> {
    Json(ApiResponse::ok(state.type_rules.list_enabled().await))
}

/// GET /asset-file-types/category/{category}
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<Vec<TypeRule>>>, AppError> {
    let rules = state.type_rules.list_by_category(&category).await?;
    Ok(Json(ApiResponse::ok(rules)))
}

/// GET /asset-file-types/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TypeRule>>, AppError> {
    let rule = state
        .type_rules
        .get_by_id(id)
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    Ok(Json(ApiResponse::ok(rule)))
}

/// POST /asset-file-types
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TypeRuleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TypeRule>>), AppError> {
    let rule = state.type_rules.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(rule))))
}

/// PUT /asset-file-types/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<TypeRuleRequest>,
) -> Result<Json<ApiResponse<TypeRule>>, AppError> {
    let rule = state
        .type_rules
        .update(id, req.into())
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    Ok(Json(ApiResponse::ok(rule)))
}

/// DELETE /asset-file-types/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    if !state.type_rules.delete(id).await? {
        return Err(rule_not_found(id));
    }
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: format!("File type rule {id} deleted"),
    })))
}

/// POST /asset-file-types/{id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TypeRule>>, AppError> {
    let rule = state
        .type_rules
        .toggle(id)
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    Ok(Json(ApiResponse::ok(rule)))
}
