//! Legacy storage migration report types.

pub mod report;

pub use report::{MigrationItem, MigrationReport, MigrationStatus};
