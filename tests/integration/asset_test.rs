//! Integration tests for asset upload, retrieval and administration.

mod helpers;

use axum::body::Bytes;
use axum::http::{StatusCode, header};
use chrono::Utc;
use serde_json::json;

use assethub_database::{AssetRegistry, AuditLog};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

async fn upload_png(app: &helpers::TestApp, folder: &str) -> i64 {
    let response = app
        .upload("Team Photo.PNG", "image/png", PNG, &[("folder", folder)])
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response.body["file_id"].as_i64().expect("file_id in upload outcome")
}

#[tokio::test]
async fn test_upload_names_blob_after_identity() {
    let app = helpers::TestApp::new().await;

    let response = app
        .upload(
            "Team Photo.PNG",
            "image/png",
            PNG,
            &[("folder", "clubs"), ("object_type", "club"), ("object_id", "7")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let id = response.body["file_id"].as_i64().unwrap();
    assert_eq!(response.body["url"], format!("/asset/{id}"));
    assert_eq!(response.body["file_size"], PNG.len() as i64);
    assert_eq!(response.body["original_file_name"], "Team Photo.PNG");

    let row = app.registry.find_by_id(id).await.unwrap().unwrap();
    let expected = format!("clubs/{}/{id}.png", row.created_at.format("%Y-%m"));
    assert_eq!(row.storage_path, expected);
    assert_eq!(row.file_name, format!("{id}.png"));
    assert_eq!(row.object_id, Some(7));
    assert_eq!(app.disk.read_bytes(&expected).await.unwrap(), Bytes::from_static(PNG));
}

#[tokio::test]
async fn test_rejected_upload_leaves_nothing_behind() {
    let app = helpers::TestApp::new().await;

    let response = app
        .upload("setup.exe", "application/x-msdownload", b"MZ", &[])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert!(
        response.body["error"]
            .as_str()
            .unwrap()
            .contains("is not allowed")
    );
    assert!(response.body["file_id"].is_null());
    assert!(app.registry.is_empty().await);
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = helpers::TestApp::new().await;

    let response = app.upload("", "", b"", &[("folder", "clubs")]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"]["code"], "VALIDATION");
    assert_eq!(response.body["error"]["message"], "No file provided");
}

#[tokio::test]
async fn test_upload_rejects_folder_traversal() {
    let app = helpers::TestApp::new().await;

    let response = app
        .upload("a.png", "image/png", PNG, &[("folder", "../../etc")])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert!(app.registry.is_empty().await);
}

#[tokio::test]
async fn test_image_is_served_inline() {
    let app = helpers::TestApp::new().await;
    let id = upload_png(&app, "clubs").await;

    let response = app.request("GET", &format!("/asset/{id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
    assert_eq!(response.header(header::CONTENT_LENGTH), PNG.len().to_string());
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=\"Team Photo.PNG\""
    );
    assert_eq!(response.raw, Bytes::from_static(PNG));
}

#[tokio::test]
async fn test_document_is_served_as_attachment() {
    let app = helpers::TestApp::new().await;
    let response = app
        .upload("minutes.pdf", "application/pdf", b"%PDF-1.7", &[("folder", "docs")])
        .await;
    let id = response.body["file_id"].as_i64().unwrap();

    let response = app.request("GET", &format!("/asset/{id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"minutes.pdf\""
    );
}

#[tokio::test]
async fn test_absolute_url_is_redirected() {
    let app = helpers::TestApp::new().await;
    app.seed_asset(helpers::asset(
        40,
        "https://cdn.example.com/clubs/2024-03/40.jpg",
        "image/jpeg",
        Utc::now(),
    ))
    .await;

    let response = app.request("GET", "/asset/40", None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        "https://cdn.example.com/clubs/2024-03/40.jpg"
    );
}

#[tokio::test]
async fn test_missing_bytes_is_not_found() {
    let app = helpers::TestApp::new().await;
    app.seed_asset(helpers::asset(5, "clubs/2024-03/5.jpg", "image/jpeg", Utc::now()))
        .await;

    let response = app.request("GET", "/asset/5", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_deleted_asset_is_hidden() {
    let app = helpers::TestApp::new().await;
    let id = upload_png(&app, "clubs").await;

    let info = app.request("GET", &format!("/asset/{id}/info"), None).await;
    assert_eq!(info.status, StatusCode::OK);
    assert_eq!(info.body["data"]["category"], "Image");
    assert_eq!(info.body["data"]["thumbnail_url"], format!("/asset/{id}"));

    let deleted = app.request("DELETE", &format!("/asset/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let info = app.request("GET", &format!("/asset/{id}/info"), None).await;
    assert_eq!(info.status, StatusCode::NOT_FOUND);
    let bytes = app.request("GET", &format!("/asset/{id}"), None).await;
    assert_eq!(bytes.status, StatusCode::NOT_FOUND);

    let again = app.request("DELETE", &format!("/asset/{id}"), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_meta() {
    let app = helpers::TestApp::new().await;
    let id = upload_png(&app, "clubs").await;

    let response = app
        .request(
            "PUT",
            &format!("/asset/{id}/meta"),
            Some(json!({ "caption": "Season opener", "sort_order": 3 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["caption"], "Season opener");
    assert_eq!(response.body["data"]["sort_order"], 3);

    let aliased = app
        .request(
            "POST",
            &format!("/asset/{id}/update-meta"),
            Some(json!({ "status": "featured" })),
        )
        .await;
    assert_eq!(aliased.status, StatusCode::OK);
    assert_eq!(aliased.body["data"]["status"], "featured");
    assert_eq!(aliased.body["data"]["caption"], "Season opener");

    let missing = app
        .request("PUT", "/asset/999/meta", Some(json!({ "caption": "x" })))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_browse_filters_by_category() {
    let app = helpers::TestApp::new().await;
    upload_png(&app, "clubs").await;
    upload_png(&app, "events").await;
    app.upload("rules.pdf", "application/pdf", b"%PDF", &[("folder", "docs")])
        .await;

    let response = app
        .request("GET", "/asset/browse?content_type=image&page_size=1", None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let page = &response.body["data"];
    assert_eq!(page["total_count"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["folder"], "events");

    let docs = app
        .request("GET", "/asset/browse?content_type=application/pdf", None)
        .await;
    assert_eq!(docs.body["data"]["total_count"], 1);
    assert!(docs.body["data"]["items"][0]["thumbnail_url"].is_null());
}

#[tokio::test]
async fn test_browse_far_page_is_empty() {
    let app = helpers::TestApp::new().await;
    upload_png(&app, "clubs").await;

    let response = app
        .request("GET", "/asset/browse?page=100000000000000000&page_size=200", None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total_count"], 1);
    assert!(response.body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_for_object() {
    let app = helpers::TestApp::new().await;
    app.upload(
        "a.png",
        "image/png",
        PNG,
        &[("folder", "clubs"), ("object_type", "club"), ("object_id", "9")],
    )
    .await;
    upload_png(&app, "clubs").await;

    let response = app.request("GET", "/asset/object/club/9", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bulk_delete_and_stats() {
    let app = helpers::TestApp::new().await;
    let a = upload_png(&app, "clubs").await;
    let b = upload_png(&app, "clubs").await;
    upload_png(&app, "events").await;

    let empty = app
        .request("POST", "/asset/bulk-delete", Some(json!({ "file_ids": [] })))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"]["message"], "No file IDs provided");

    let response = app
        .request(
            "POST",
            "/asset/bulk-delete",
            Some(json!({ "file_ids": [a, b, b, 999], "actor_id": 3 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 2);

    let audit = app.audit.recent(Some("asset.bulk_delete"), 10).await.unwrap();
    assert_eq!(audit.len(), 1);

    let stats = app.request("GET", "/asset/stats", None).await;
    assert_eq!(stats.status, StatusCode::OK);
    let data = &stats.body["data"];
    assert_eq!(data["total_assets"], 3);
    assert_eq!(data["active_assets"], 1);
    assert_eq!(data["deleted_assets"], 2);
    assert_eq!(data["by_folder"][0]["folder"], "events");
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["storage"]["local"], true);
}
