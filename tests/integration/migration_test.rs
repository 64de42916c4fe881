//! Integration tests for the legacy layout migration endpoints.

mod helpers;

use axum::body::Bytes;
use axum::http::StatusCode;
use chrono::{TimeZone, Utc};

use assethub_database::{AssetRegistry, AuditLog};

const LEGACY: &str = "3f2b8c1e-9d4a-4e7b-a1c2-0b9e8d7f6a5c.jpg";

async fn seed_legacy(app: &helpers::TestApp, file_id: i64, with_file: bool) -> String {
    let created_at = Utc.with_ymd_and_hms(2023, 11, 20, 8, 30, 0).unwrap();
    let old_path = format!("clubs/{LEGACY}");
    app.seed_asset(helpers::asset(file_id, &old_path, "image/jpeg", created_at))
        .await;
    if with_file {
        app.disk
            .write(&old_path, Bytes::from_static(b"jpg"))
            .await
            .unwrap();
    }
    old_path
}

#[tokio::test]
async fn test_preview_changes_nothing() {
    let app = helpers::TestApp::new().await;
    let old_path = seed_legacy(&app, 17, true).await;

    let response = app.request("POST", "/asset/migrate/preview", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let report = &response.body["data"];
    assert_eq!(report["is_preview"], true);
    assert_eq!(report["total_assets"], 1);
    assert_eq!(report["needs_migration"], 1);
    assert_eq!(report["items"][0]["status"], "pending");
    assert_eq!(report["items"][0]["new_path"], "clubs/2023-11/17.jpg");

    assert!(app.disk.exists(&old_path).await.unwrap());
    let row = app.registry.find_by_id(17).await.unwrap().unwrap();
    assert_eq!(row.storage_path, old_path);
}

#[tokio::test]
async fn test_execute_moves_and_backs_up() {
    let app = helpers::TestApp::new().await;
    let old_path = seed_legacy(&app, 17, true).await;

    let response = app
        .request("POST", "/asset/migrate/execute?actor_id=1", None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let report = &response.body["data"];
    assert_eq!(report["success_count"], 1);
    assert_eq!(report["items"][0]["status"], "success");

    let row = app.registry.find_by_id(17).await.unwrap().unwrap();
    assert_eq!(row.storage_path, "clubs/2023-11/17.jpg");
    assert_eq!(row.file_name, "17.jpg");
    assert!(app.disk.exists("clubs/2023-11/17.jpg").await.unwrap());
    assert!(!app.disk.exists(&old_path).await.unwrap());
    assert!(
        app.disk
            .exists(&format!("_migration_backup/clubs/{LEGACY}"))
            .await
            .unwrap()
    );

    // Served from the new location.
    let bytes = app.request("GET", "/asset/17", None).await;
    assert_eq!(bytes.status, StatusCode::OK);
    assert_eq!(bytes.raw, Bytes::from_static(b"jpg"));

    let audit = app
        .audit
        .recent(Some("asset.migration.execute"), 10)
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].actor_id, Some(1));

    // A second run finds nothing left to do.
    let rerun = app.request("POST", "/asset/migrate", None).await;
    assert_eq!(rerun.status, StatusCode::OK);
    assert_eq!(rerun.body["data"]["needs_migration"], 0);
    assert_eq!(rerun.body["data"]["already_migrated"], 1);
}

#[tokio::test]
async fn test_missing_source_is_reported_per_item() {
    let app = helpers::TestApp::new().await;
    seed_legacy(&app, 17, false).await;
    let created_at = Utc.with_ymd_and_hms(2023, 11, 20, 8, 30, 0).unwrap();
    let other = "clubs/0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d.png";
    app.seed_asset(helpers::asset(18, other, "image/png", created_at))
        .await;
    app.disk
        .write(other, Bytes::from_static(b"png"))
        .await
        .unwrap();

    let response = app.request("POST", "/asset/migrate/execute", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let report = &response.body["data"];
    assert_eq!(report["needs_migration"], 2);
    assert_eq!(report["file_not_found_count"], 1);
    assert_eq!(report["success_count"], 1);

    let row = app.registry.find_by_id(17).await.unwrap().unwrap();
    assert!(row.storage_path.ends_with(LEGACY));
}
