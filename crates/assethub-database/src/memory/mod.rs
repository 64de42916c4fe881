//! In-memory implementations of the persistence traits.
//!
//! Used by tests and local tooling. Identity allocation and every mutation
//! happen under a single write lock, so ids are unique and never reused.

pub mod asset;
pub mod audit;
pub mod type_rule;

pub use asset::MemoryAssetRegistry;
pub use audit::MemoryAuditLog;
pub use type_rule::MemoryTypeRuleRepository;
