//! Shared test helpers for integration tests.
//!
//! The router is built exactly as in production, over in-memory
//! persistence and a temporary local storage root.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use assethub_api::{AppState, Backends, build_router};
use assethub_cache::CacheManager;
use assethub_core::config::{AssetsConfig, ServerConfig};
use assethub_core::traits::storage::StorageProvider;
use assethub_database::memory::{MemoryAssetRegistry, MemoryAuditLog, MemoryTypeRuleRepository};
use assethub_entity::asset::Asset;
use assethub_storage::StorageManager;
use assethub_storage::providers::LocalStorageProvider;

const BOUNDARY: &str = "assethub-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Asset rows
    pub registry: Arc<MemoryAssetRegistry>,
    /// Type rules (empty until a test creates one)
    pub type_rules: Arc<MemoryTypeRuleRepository>,
    /// Audit trail
    pub audit: Arc<MemoryAuditLog>,
    /// The local storage provider behind the router
    pub disk: Arc<dyn StorageProvider>,
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().to_str().expect("Temp dir is not UTF-8");
        let disk: Arc<dyn StorageProvider> = Arc::new(
            LocalStorageProvider::new(root)
                .await
                .expect("Failed to init local storage"),
        );
        let storage = Arc::new(StorageManager::new());
        storage.register("local", disk.clone(), true).await;

        let registry = Arc::new(MemoryAssetRegistry::new());
        let type_rules = Arc::new(MemoryTypeRuleRepository::new());
        let audit = Arc::new(MemoryAuditLog::new());

        let backends = Backends {
            registry: registry.clone(),
            type_rules: type_rules.clone(),
            audit: audit.clone(),
            cache: Arc::new(CacheManager::in_memory()),
            storage,
        };
        let state = AppState::build(ServerConfig::default(), &AssetsConfig::default(), backends)
            .expect("Failed to build state");

        Self {
            router: build_router(state),
            registry,
            type_rules,
            audit,
            disk,
            _dir: dir,
        }
    }

    /// Send a request with an optional JSON body
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload a file through `POST /asset/upload`
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        data: &[u8],
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if !file_name.is_empty() {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/asset/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }

    /// Insert a finalized asset row directly
    pub async fn seed_asset(&self, asset: Asset) {
        self.registry.insert(asset).await;
    }
}

/// A finalized asset row with sensible defaults
pub fn asset(file_id: i64, storage_path: &str, content_type: &str, created_at: DateTime<Utc>) -> Asset {
    let file_name = storage_path.rsplit('/').next().unwrap_or(storage_path).to_string();
    Asset {
        file_id,
        file_name,
        original_file_name: format!("original-{file_id}"),
        content_type: content_type.to_string(),
        file_size: 3,
        storage_provider: "Local".to_string(),
        storage_path: storage_path.to_string(),
        folder: storage_path.split('/').next().map(str::to_string),
        object_type: None,
        object_id: None,
        uploaded_by: None,
        status: None,
        sort_order: 0,
        caption: None,
        is_deleted: false,
        deleted_at: None,
        created_at,
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body (`Null` for non-JSON bodies)
    pub body: Value,
    /// Raw body bytes
    pub raw: Bytes,
}

impl TestResponse {
    /// A header value as a string, or empty
    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}
