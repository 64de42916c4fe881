//! HTTP request handlers, one module per resource.

pub mod asset;
pub mod health;
pub mod migration;
pub mod type_rule;
