//! Asset retrieval, upload, and administration handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use assethub_core::error::AppError;
use assethub_core::types::PageResponse;
use assethub_entity::asset::AssetStats;
use assethub_entity::asset::DEFAULT_FOLDER;
use assethub_service::{AssetContent, UploadOutcome, UploadRequest};

use crate::dto::request::{BrowseParams, BulkDeleteRequest, UpdateMetaRequest};
use crate::dto::response::{ApiResponse, AssetResponse, CountResponse, MessageResponse};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// GET /asset/{id}
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let response = match state.assets.get_content(id).await? {
        AssetContent::Redirect(url) => Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, url)
            .body(Body::empty()),
        AssetContent::Stream {
            stream,
            content_type,
            file_name,
            size,
            inline,
        } => {
            let disposition = if inline { "inline" } else { "attachment" };
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, size)
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("{disposition}; filename=\"{}\"", header_safe(&file_name)),
                )
                .header(header::CACHE_CONTROL, "public, max-age=3600")
                .body(Body::from_stream(stream))
        }
    };

    response.map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

/// Strip characters that cannot appear inside a quoted header parameter.
fn header_safe(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

/// GET /asset/{id}/info
pub async fn get_info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AssetResponse>>, AppError> {
    let asset = state.assets.get_active(id).await?;
    Ok(Json(ApiResponse::ok(asset.into())))
}

/// POST /asset/upload (multipart)
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadOutcome>), AppError> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut folder: Option<String> = None;
    let mut object_type: Option<String> = None;
    let mut object_id: Option<i64> = None;
    let mut uploaded_by: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                file = Some((file_name, content_type, data));
            }
            "folder" => folder = Some(read_text(field).await?),
            "object_type" => object_type = Some(read_text(field).await?).filter(|v| !v.is_empty()),
            "object_id" => object_id = parse_optional_id("object_id", &read_text(field).await?)?,
            "uploaded_by" => uploaded_by = parse_optional_id("uploaded_by", &read_text(field).await?)?,
            _ => {}
        }
    }

    let (original_file_name, content_type, data) = file
        .filter(|(_, _, data)| !data.is_empty())
        .ok_or_else(|| AppError::validation("No file provided"))?;

    let outcome = state
        .uploads
        .upload(UploadRequest {
            data,
            original_file_name,
            content_type,
            folder: folder
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            object_type,
            object_id,
            uploaded_by,
        })
        .await?;

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(outcome)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::validation(format!("Read error: {e}")))
}

fn parse_optional_id(name: &str, value: &str) -> Result<Option<i64>, AppError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::validation(format!("Invalid {name}")))
}

/// GET /asset/browse
pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<ApiResponse<PageResponse<AssetResponse>>>, AppError> {
    let query = params.into_query()?;
    let page = state.assets.browse(&query).await?;
    Ok(Json(ApiResponse::ok(page.map(AssetResponse::from))))
}

/// GET /asset/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<ApiResponse<AssetStats>>, AppError> {
    let stats = state.assets.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /asset/object/{object_type}/{object_id}
pub async fn list_for_object(
    State(state): State<AppState>,
    Path((object_type, object_id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<Vec<AssetResponse>>>, AppError> {
    let assets = state.assets.list_for_object(&object_type, object_id).await?;
    Ok(Json(ApiResponse::ok(
        assets.into_iter().map(AssetResponse::from).collect(),
    )))
}

/// PUT /asset/{id}/meta
pub async fn update_meta(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateMetaRequest>,
) -> Result<Json<ApiResponse<AssetResponse>>, AppError> {
    let asset = state
        .assets
        .update_meta(id, &req.into())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))?;
    Ok(Json(ApiResponse::ok(asset.into())))
}

/// DELETE /asset/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.assets.delete(id).await? {
        return Err(AppError::not_found(format!("Asset {id} not found")));
    }
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: format!("Asset {id} deleted"),
    })))
}

/// POST /asset/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<CountResponse>>, AppError> {
    let count = state.assets.bulk_delete(&req.file_ids, req.actor_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_strips_quotes() {
        assert_eq!(header_safe("a\"b\\c\n.png"), "abc.png");
        assert_eq!(header_safe("Photo 1.JPG"), "Photo 1.JPG");
    }

    #[test]
    fn test_parse_optional_id() {
        assert_eq!(parse_optional_id("object_id", "").unwrap(), None);
        assert_eq!(parse_optional_id("object_id", "42").unwrap(), Some(42));
        assert!(parse_optional_id("object_id", "forty").is_err());
    }
}
