//! PostgreSQL implementations of the persistence traits.

pub mod asset;
pub mod audit;
pub mod type_rule;

pub use asset::PgAssetRegistry;
pub use audit::PgAuditLog;
pub use type_rule::PgTypeRuleRepository;
