//! # assethub-database
//!
//! PostgreSQL connection management, the schema migration runner, and the
//! persistence traits behind the asset subsystem together with their
//! PostgreSQL and in-memory implementations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod traits;

pub use connection::DatabasePool;
pub use traits::{AssetRegistry, AuditLog, TypeRuleRepository};
