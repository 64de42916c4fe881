//! Deterministic storage layout.
//!
//! Current assets live at `{folder}/{yyyy-MM}/{file_id}{ext}`; originals
//! displaced by the legacy migration live at
//! `{backup_dir}/{folder}/{legacy_file_name}`.

use chrono::{DateTime, Utc};

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_entity::asset::DEFAULT_FOLDER;

/// Month bucket for an asset, formatted `yyyy-MM`.
pub fn date_folder(created_at: DateTime<Utc>) -> String {
    created_at.format("%Y-%m").to_string()
}

/// Stored filename derived from identity, e.g. `17.jpg`.
pub fn asset_file_name(file_id: i64, extension: &str) -> String {
    format!("{file_id}{}", extension.to_lowercase())
}

/// Directory an asset's bytes are written to, e.g. `clubs/2024-03`.
pub fn target_folder(folder: &str, created_at: DateTime<Utc>) -> String {
    join(folder, &date_folder(created_at))
}

/// Full storage path for an asset, e.g. `clubs/2024-03/17.jpg`.
pub fn asset_path(folder: &str, created_at: DateTime<Utc>, file_id: i64, extension: &str) -> String {
    join(
        &target_folder(folder, created_at),
        &asset_file_name(file_id, extension),
    )
}

/// Location a migrated-away legacy original is moved to.
pub fn backup_path(backup_dir: &str, folder: &str, legacy_file_name: &str) -> String {
    join(&join(backup_dir, folder), legacy_file_name)
}

/// Join two relative path segments with a single `/`.
pub fn join(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}/{name}"),
    }
}

/// Normalize a caller-supplied folder: forward slashes, no leading or
/// trailing separators, no empty segments. Blank input becomes
/// [`DEFAULT_FOLDER`]. Parent (`..`) and current (`.`) segments are rejected.
pub fn normalize_folder(folder: &str) -> AppResult<String> {
    let replaced = folder.trim().replace('\\', "/");
    let mut segments = Vec::new();
    for segment in replaced.split('/').map(str::trim).filter(|s| !s.is_empty()) {
        if segment == ".." || segment == "." {
            return Err(AppError::validation(format!("Invalid folder: '{folder}'")));
        }
        segments.push(segment);
    }
    if segments.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }
    Ok(segments.join("/"))
}
