//! # assethub-entity
//!
//! Domain entity models for AssetHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod asset;
pub mod audit;
pub mod migration;
pub mod storage;
pub mod type_rule;
