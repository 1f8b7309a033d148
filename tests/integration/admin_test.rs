//! Integration tests for health, pool administration, and holder profiles.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::with_units(0).await;

    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["store"], "connected");
}

#[tokio::test]
async fn test_seed_pool_skips_existing_ordinals() {
    let app = TestApp::with_units(0).await;

    let seeded = app
        .request(
            "POST",
            "/api/admin/pool/seed",
            Some(json!({ "count": 5, "label_prefix": "Plot" })),
        )
        .await;
    assert_eq!(seeded.status, StatusCode::CREATED);
    assert_eq!(seeded.data()["inserted"], 5);

    let overlap = app
        .request(
            "POST",
            "/api/admin/pool/seed",
            Some(json!({ "first_ordinal": 4, "count": 3 })),
        )
        .await;
    assert_eq!(overlap.data()["inserted"], 1);

    let units = app.request("GET", "/api/pool/units", None).await;
    let units = units.data().as_array().unwrap();
    assert_eq!(units.len(), 6);
    assert_eq!(units[0]["label"], "Plot #1");

    let stats = app.request("GET", "/api/pool/stats", None).await;
    assert_eq!(stats.data()["total"], 6);
    assert_eq!(stats.data()["available"], 6);
}

#[tokio::test]
async fn test_seed_pool_validates_count() {
    let app = TestApp::with_units(0).await;

    let response = app
        .request("POST", "/api/admin/pool/seed", Some(json!({ "count": 0 })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_display_name_is_frozen_at_sale() {
    let app = TestApp::with_units(1).await;

    let updated = app
        .request(
            "PUT",
            "/api/holders/alice/profile",
            Some(json!({ "display_name": "Alice Farms" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    app.allocate("alice").await;
    app.request(
        "POST",
        "/api/holders/alice/complete",
        Some(json!({ "external_ref": "tx-1" })),
    )
    .await;

    app.request(
        "PUT",
        "/api/holders/alice/profile",
        Some(json!({ "display_name": "Renamed" })),
    )
    .await;

    let units = app.request("GET", "/api/pool/units", None).await;
    assert_eq!(units.data()[0]["attribution_snapshot"], "Alice Farms");
}
