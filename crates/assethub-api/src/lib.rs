//! # assethub-api
//!
//! HTTP API layer for AssetHub built on Axum.
//!
//! Provides the asset, type-rule, migration and health endpoints, request
//! logging and CORS middleware, extractors, DTOs, and the shared
//! [`AppState`].

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::{AppState, Backends};
