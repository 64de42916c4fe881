//! Route definitions for the AssetHub HTTP API.
//!
//! Asset and type-rule routes sit at the root; the health check is mounted
//! under `/api`. `POST /asset/{id}/update-meta` and `POST /asset/migrate`
//! are kept as aliases for older asset clients.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = state.server.clone();

    let api_routes = Router::new().route("/health", get(handlers::health::health));

    Router::new()
        .merge(asset_routes())
        .merge(migration_routes())
        .merge(type_rule_routes())
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Asset retrieval, upload and administration
fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/asset/upload", post(handlers::asset::upload))
        .route("/asset/browse", get(handlers::asset::browse))
        .route("/asset/stats", get(handlers::asset::stats))
        .route("/asset/bulk-delete", post(handlers::asset::bulk_delete))
        .route(
            "/asset/object/{object_type}/{object_id}",
            get(handlers::asset::list_for_object),
        )
        .route(
            "/asset/{id}",
            get(handlers::asset::get_content).delete(handlers::asset::delete),
        )
        .route("/asset/{id}/info", get(handlers::asset::get_info))
        .route("/asset/{id}/meta", put(handlers::asset::update_meta))
        .route("/asset/{id}/update-meta", post(handlers::asset::update_meta))
}

/// Legacy layout migration
fn migration_routes() -> Router<AppState> {
    Router::new()
        .route("/asset/migrate/preview", post(handlers::migration::preview))
        .route("/asset/migrate/execute", post(handlers::migration::execute))
        .route("/asset/migrate", post(handlers::migration::execute))
}

/// Upload type-rule administration
fn type_rule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/asset-file-types",
            get(handlers::type_rule::list_all).post(handlers::type_rule::create),
        )
        .route(
            "/asset-file-types/enabled",
            get(handlers::type_rule::list_enabled),
        )
        .route(
            "/asset-file-types/category/{category}",
            get(handlers::type_rule::list_by_category),
        )
        .route(
            "/asset-file-types/{id}",
            get(handlers::type_rule::get)
                .put(handlers::type_rule::update)
                .delete(handlers::type_rule::delete),
        )
        .route(
            "/asset-file-types/{id}/toggle",
            post(handlers::type_rule::toggle),
        )
}
