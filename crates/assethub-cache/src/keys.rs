//! Cache key builders for all AssetHub cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all AssetHub cache keys.
const PREFIX: &str = "assethub";

// ── Type rule keys ─────────────────────────────────────────

/// Cache key for the list of enabled upload type rules.
pub fn enabled_type_rules() -> String {
    format!("{PREFIX}:type_rules:enabled")
}

// ── Migration keys ─────────────────────────────────────────

/// Cache key holding the single-flight legacy migration lock.
pub fn migration_lock() -> String {
    format!("{PREFIX}:migration:lock")
}
