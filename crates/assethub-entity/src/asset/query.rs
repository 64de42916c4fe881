//! Browse filters for the asset registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assethub_core::types::PageRequest;

use super::category::AssetCategory;
use super::model::Asset;

/// Content type filter accepted by browse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentTypeFilter {
    /// A category family (`image`, `video`, `audio`, `document`).
    Category(AssetCategory),
    /// An exact MIME type, compared case-insensitively.
    Exact(String),
}

impl ContentTypeFilter {
    /// Parse a filter value. Empty input means "no filter".
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.contains('/') {
            return Some(Self::Exact(value.to_ascii_lowercase()));
        }
        let filter = value
            .parse::<AssetCategory>()
            .map(Self::Category)
            .unwrap_or_else(|_| Self::Exact(value.to_ascii_lowercase()));
        Some(filter)
    }

    /// Whether a content type satisfies the filter.
    pub fn matches(&self, content_type: &str) -> bool {
        match self {
            Self::Category(category) => AssetCategory::from_content_type(content_type) == *category,
            Self::Exact(mime) => content_type.eq_ignore_ascii_case(mime),
        }
    }
}

/// Filters and paging for an administrative asset listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetBrowseQuery {
    /// Page and page size (already clamped).
    pub page: PageRequest,
    /// Content type family or exact MIME type.
    pub content_type: Option<ContentTypeFilter>,
    /// Exact folder match.
    pub folder: Option<String>,
    /// Owning entity type.
    pub object_type: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring over filenames and caption.
    pub search: Option<String>,
    /// Include soft-deleted assets.
    pub include_deleted: bool,
}

impl AssetBrowseQuery {
    /// Evaluate the filters against a single asset. Provisional rows never match.
    pub fn matches(&self, asset: &Asset) -> bool {
        if asset.is_pending() {
            return false;
        }
        if !self.include_deleted && asset.is_deleted {
            return false;
        }
        if let Some(filter) = &self.content_type {
            if !filter.matches(&asset.content_type) {
                return false;
            }
        }
        if let Some(folder) = &self.folder {
            if asset.folder.as_deref() != Some(folder.as_str()) {
                return false;
            }
        }
        if let Some(object_type) = &self.object_type {
            if asset.object_type.as_deref() != Some(object_type.as_str()) {
                return false;
            }
        }
        if self.date_from.is_some_and(|from| asset.created_at < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| asset.created_at > to) {
            return false;
        }
        if let Some(search) = self.search_pattern() {
            let haystacks = [
                Some(asset.original_file_name.as_str()),
                Some(asset.file_name.as_str()),
                asset.caption.as_deref(),
            ];
            let hit = haystacks
                .into_iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&search));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Lower-cased, trimmed search text, if any.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        assert_eq!(ContentTypeFilter::parse(""), None);
        assert_eq!(
            ContentTypeFilter::parse("video"),
            Some(ContentTypeFilter::Category(AssetCategory::Video))
        );
        assert_eq!(
            ContentTypeFilter::parse("Application/PDF"),
            Some(ContentTypeFilter::Exact("application/pdf".to_string()))
        );
    }

    #[test]
    fn test_document_family_excludes_media() {
        let filter = ContentTypeFilter::Category(AssetCategory::Document);
        assert!(filter.matches("application/pdf"));
        assert!(!filter.matches("image/png"));
    }
}
