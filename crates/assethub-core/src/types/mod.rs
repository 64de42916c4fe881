//! Core type definitions used across the AssetHub workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
