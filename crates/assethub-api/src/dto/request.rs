//! Request DTOs with validation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use assethub_core::error::AppError;
use assethub_core::types::PageRequest;
use assethub_core::types::pagination::DEFAULT_PAGE_SIZE;
use assethub_entity::asset::{AssetBrowseQuery, AssetMetaUpdate, ContentTypeFilter};
use assethub_entity::type_rule::TypeRuleInput;

/// Query parameters for `GET /asset/browse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowseParams {
    /// Page number (1-based, default: 1).
    pub page: Option<u64>,
    /// Items per page (default: 50, max: 200).
    pub page_size: Option<u64>,
    /// Category family (`image`, `video`, `audio`, `document`) or exact MIME type.
    pub content_type: Option<String>,
    /// Exact folder.
    pub folder: Option<String>,
    /// Owning entity type.
    pub object_type: Option<String>,
    /// Lower bound on creation time (RFC 3339 or `YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Upper bound on creation time (RFC 3339 or `YYYY-MM-DD`, whole day).
    pub date_to: Option<String>,
    /// Filename or caption substring.
    pub search: Option<String>,
    /// Include soft-deleted assets.
    #[serde(default)]
    pub include_deleted: bool,
}

impl BrowseParams {
    /// Converts to a registry query, clamping paging and parsing dates.
    pub fn into_query(self) -> Result<AssetBrowseQuery, AppError> {
        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        );

        let date_from = self
            .date_from
            .as_deref()
            .map(|v| parse_date(v, NaiveTime::MIN))
            .transpose()?;
        let date_to = self
            .date_to
            .as_deref()
            .map(|v| parse_date(v, end_of_day()))
            .transpose()?;

        Ok(AssetBrowseQuery {
            page,
            content_type: self.content_type.as_deref().and_then(ContentTypeFilter::parse),
            folder: non_blank(self.folder),
            object_type: non_blank(self.object_type),
            date_from,
            date_to,
            search: non_blank(self.search),
            include_deleted: self.include_deleted,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Parse an RFC 3339 timestamp, or a bare date at `time_of_day` UTC.
fn parse_date(value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(time_of_day).and_utc())
        .map_err(|_| AppError::validation(format!("Invalid date: '{value}'")))
}

/// Body for `PUT /asset/{id}/meta`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMetaRequest {
    /// Caption.
    #[validate(length(max = 500))]
    pub caption: Option<String>,
    /// Sort order.
    pub sort_order: Option<i32>,
    /// Status.
    #[validate(length(max = 50))]
    pub status: Option<String>,
}

impl From<UpdateMetaRequest> for AssetMetaUpdate {
    fn from(req: UpdateMetaRequest) -> Self {
        Self {
            caption: req.caption,
            sort_order: req.sort_order,
            status: req.status,
        }
    }
}

/// Body for `POST /asset/bulk-delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    /// Assets to soft-delete.
    #[serde(default)]
    pub file_ids: Vec<i64>,
    /// Acting administrator, recorded in the audit trail.
    pub actor_id: Option<i64>,
}

/// Optional acting administrator for audited operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorParams {
    /// Actor id.
    pub actor_id: Option<i64>,
}

/// Create or update a type rule.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TypeRuleRequest {
    /// MIME type.
    #[validate(length(min = 1, max = 100, message = "MIME type is required"))]
    pub mime_type: String,
    /// Comma-separated extensions.
    #[validate(length(min = 1, message = "At least one extension is required"))]
    pub extensions: String,
    /// Category name.
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    /// Size ceiling in MB.
    #[validate(range(min = 1, max = 10240))]
    pub max_size_mb: i32,
    /// Whether uploads may match the rule.
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    /// Human-readable label.
    #[validate(length(min = 1, max = 100, message = "Display name is required"))]
    pub display_name: String,
}

fn default_enabled() -> bool {
    true
}

impl From<TypeRuleRequest> for TypeRuleInput {
    fn from(req: TypeRuleRequest) -> Self {
        Self {
            mime_type: req.mime_type,
            extensions: req.extensions,
            category: req.category,
            max_size_mb: req.max_size_mb,
            is_enabled: req.is_enabled,
            display_name: req.display_name,
        }
    }
}
