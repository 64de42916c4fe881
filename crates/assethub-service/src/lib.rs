//! # assethub-service
//!
//! Business logic service layer for AssetHub. Each service orchestrates the
//! registry, the type-rule store, the cache, and the storage providers to
//! implement one part of the asset lifecycle.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod asset;
pub mod audit;
pub mod migration;
pub mod type_rule;

pub use asset::{AssetContent, AssetService, UploadOutcome, UploadPipeline, UploadRequest};
pub use migration::{LegacyMigrator, MigrationGuard};
pub use type_rule::{FallbackRules, FileValidator, RuleSource, TypeRuleStore};
