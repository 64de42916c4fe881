//! Legacy storage layout migration.

pub mod guard;
pub mod legacy;

pub use guard::MigrationGuard;
pub use legacy::{LegacyMigrator, LegacyNamePattern};
