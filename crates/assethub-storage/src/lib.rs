//! # assethub-storage
//!
//! Blob storage for AssetHub: the local filesystem and S3-compatible
//! providers, the [`StorageManager`] that routes each asset to the backend
//! recorded on it, and the deterministic storage [`layout`].

pub mod layout;
pub mod manager;
pub mod providers;

pub use manager::StorageManager;
