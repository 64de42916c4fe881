//! Storage backend identifiers.

pub mod provider;

pub use provider::StorageProviderType;
