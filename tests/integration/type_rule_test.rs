//! Integration tests for type-rule administration and its effect on uploads.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

fn avif_rule() -> Value {
    json!({
        "mime_type": "image/avif",
        "extensions": "AVIF",
        "category": "image",
        "max_size_mb": 1,
        "display_name": "AVIF Image"
    })
}

#[tokio::test]
async fn test_empty_table_serves_fallback_rules() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/asset-file-types/enabled", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let rules = response.body["data"].as_array().unwrap();
    assert_eq!(rules.len(), 12);
    assert!(rules.iter().any(|r| r["mime_type"] == "application/pdf"));

    let all = app.request("GET", "/asset-file-types", None).await;
    assert_eq!(all.body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_created_rule_replaces_fallback_for_uploads() {
    let app = helpers::TestApp::new().await;

    // Fallback rules are in force while the table is empty.
    let jpg = app.upload("a.jpg", "image/jpeg", b"jpg", &[]).await;
    assert_eq!(jpg.status, StatusCode::OK);

    let created = app
        .request("POST", "/asset-file-types", Some(avif_rule()))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["extensions"], ".avif");
    assert_eq!(created.body["data"]["category"], "Image");
    assert_eq!(created.body["data"]["is_enabled"], true);

    let enabled = app.request("GET", "/asset-file-types/enabled", None).await;
    assert_eq!(enabled.body["data"].as_array().unwrap().len(), 1);

    let avif = app.upload("b.avif", "image/avif", b"avif", &[]).await;
    assert_eq!(avif.status, StatusCode::OK);

    let jpg = app.upload("c.jpg", "image/jpeg", b"jpg", &[]).await;
    assert_eq!(jpg.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_size_ceiling_enforced() {
    let app = helpers::TestApp::new().await;
    app.request("POST", "/asset-file-types", Some(avif_rule()))
        .await;

    let big = vec![0u8; 1_048_577];
    let response = app.upload("big.avif", "image/avif", &big, &[]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "File size exceeds the 1MB limit for AVIF Image"
    );
}

#[tokio::test]
async fn test_invalid_rule_rejected() {
    let app = helpers::TestApp::new().await;

    let mut rule = avif_rule();
    rule["max_size_mb"] = json!(0);
    let response = app.request("POST", "/asset-file-types", Some(rule)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "VALIDATION");

    let mut rule = avif_rule();
    rule["category"] = json!("spreadsheet");
    let response = app.request("POST", "/asset-file-types", Some(rule)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_update_delete() {
    let app = helpers::TestApp::new().await;
    let created = app
        .request("POST", "/asset-file-types", Some(avif_rule()))
        .await;
    let id = created.body["data"]["id"].as_i64().unwrap();

    let toggled = app
        .request("POST", &format!("/asset-file-types/{id}/toggle"), None)
        .await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert_eq!(toggled.body["data"]["is_enabled"], false);

    // No enabled rows left, so the fallback set is back in force.
    let enabled = app.request("GET", "/asset-file-types/enabled", None).await;
    assert_eq!(enabled.body["data"].as_array().unwrap().len(), 12);

    let mut rule = avif_rule();
    rule["max_size_mb"] = json!(50);
    let updated = app
        .request("PUT", &format!("/asset-file-types/{id}"), Some(rule))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["max_size_mb"], 50);

    let fetched = app.request("GET", &format!("/asset-file-types/{id}"), None).await;
    assert_eq!(fetched.body["data"]["display_name"], "AVIF Image");

    let deleted = app
        .request("DELETE", &format!("/asset-file-types/{id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let missing = app.request("GET", &format!("/asset-file-types/{id}"), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    let missing = app
        .request("POST", &format!("/asset-file-types/{id}/toggle"), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_by_category() {
    let app = helpers::TestApp::new().await;
    app.request("POST", "/asset-file-types", Some(avif_rule()))
        .await;

    let images = app
        .request("GET", "/asset-file-types/category/image", None)
        .await;
    assert_eq!(images.status, StatusCode::OK);
    assert_eq!(images.body["data"].as_array().unwrap().len(), 1);

    let videos = app
        .request("GET", "/asset-file-types/category/Video", None)
        .await;
    assert_eq!(videos.body["data"].as_array().unwrap().len(), 0);

    let unknown = app
        .request("GET", "/asset-file-types/category/spreadsheet", None)
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}
