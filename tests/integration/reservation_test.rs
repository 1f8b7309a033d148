//! Integration tests for the reservation lifecycle over HTTP.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_allocate_returns_lowest_unit_and_is_idempotent() {
    let app = TestApp::with_units(3).await;

    let first = app
        .request("POST", "/api/reservations", Some(json!({ "holder_id": "alice" })))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.data()["unit"]["ordinal"], 1);
    assert_eq!(first.data()["unit"]["status"], "reserved");
    assert_eq!(first.data()["is_existing"], false);

    let again = app
        .request("POST", "/api/reservations", Some(json!({ "holder_id": "alice" })))
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.data()["is_existing"], true);
    assert_eq!(
        again.data()["reservation"]["id"],
        first.data()["reservation"]["id"]
    );

    let bob = app
        .request("POST", "/api/reservations", Some(json!({ "holder_id": "bob" })))
        .await;
    assert_eq!(bob.data()["unit"]["ordinal"], 2);
}

#[tokio::test]
async fn test_allocate_rejects_blank_holder() {
    let app = TestApp::with_units(1).await;

    let response = app
        .request("POST", "/api/reservations", Some(json!({ "holder_id": "   " })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));

    let response = app.request("POST", "/api/reservations", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_then_completion_sells_unit() {
    let app = TestApp::with_units(2).await;
    let id = app.allocate("alice").await;

    let opened = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/payment-window/open"),
            None,
        )
        .await;
    assert_eq!(opened.status, StatusCode::OK);
    assert!(opened.data()["payment_window_opened_at"].is_string());

    let completed = app
        .request(
            "POST",
            "/api/holders/alice/complete",
            Some(json!({ "external_ref": "tx-100" })),
        )
        .await;
    assert_eq!(completed.status, StatusCode::OK);
    assert_eq!(completed.data()["reservation"]["status"], "completed");
    assert_eq!(completed.data()["reservation"]["external_ref"], "tx-100");
    assert_eq!(completed.data()["unit"]["status"], "sold");
    assert_eq!(completed.data()["unit"]["sold_to"], "alice");

    let history = app
        .request("GET", "/api/holders/alice/history", None)
        .await;
    assert_eq!(history.data()["has_claimed"], true);
    assert_eq!(history.data()["reservations"].as_array().unwrap().len(), 1);

    let retry = app
        .request("POST", "/api/reservations", Some(json!({ "holder_id": "alice" })))
        .await;
    assert_eq!(retry.status, StatusCode::CONFLICT);
    assert_eq!(retry.error_code(), Some("ALREADY_CLAIMED"));
}

#[tokio::test]
async fn test_exhausted_pool_is_temporary_then_permanent() {
    let app = TestApp::with_units(1).await;
    let id = app.allocate("alice").await;

    let waiting = app
        .request("POST", "/api/reservations", Some(json!({ "holder_id": "bob" })))
        .await;
    assert_eq!(waiting.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(waiting.error_code(), Some("TEMPORARILY_UNAVAILABLE"));

    let completed = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/complete"),
            Some(json!({})),
        )
        .await;
    assert_eq!(completed.status, StatusCode::OK);

    let gone = app
        .request("POST", "/api/reservations", Some(json!({ "holder_id": "bob" })))
        .await;
    assert_eq!(gone.status, StatusCode::GONE);
    assert_eq!(gone.error_code(), Some("PERMANENTLY_UNAVAILABLE"));

    let stats = app.request("GET", "/api/pool/stats", None).await;
    assert_eq!(stats.data()["sold"], 1);
    assert_eq!(stats.data()["sold_out"], true);
}

#[tokio::test]
async fn test_expired_reservation_is_swept_and_cannot_complete() {
    let app = TestApp::with_units(1).await;
    let id = app.allocate("alice").await;

    app.advance(Duration::minutes(20) + Duration::seconds(6));

    let active = app.request("GET", "/api/holders/alice/active", None).await;
    assert_eq!(active.data()["is_expired"], true);
    assert_eq!(active.data()["remaining_ms"], 0);

    let swept = app.request("POST", "/api/admin/sweep", None).await;
    assert_eq!(swept.status, StatusCode::OK);
    assert_eq!(swept.data()["expired"], 1);

    let active = app.request("GET", "/api/holders/alice/active", None).await;
    assert!(active.data().is_null());

    let late = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/complete"),
            Some(json!({ "external_ref": "tx-late" })),
        )
        .await;
    assert_eq!(late.status, StatusCode::CONFLICT);
    assert_eq!(late.error_code(), Some("NOT_ACTIVE"));

    let units = app.request("GET", "/api/pool/units", None).await;
    assert_eq!(units.data()[0]["status"], "available");
}

#[tokio::test]
async fn test_open_payment_window_holds_reservation_past_deadline() {
    let app = TestApp::with_units(1).await;
    let id = app.allocate("alice").await;
    app.request(
        "POST",
        &format!("/api/reservations/{id}/payment-window/open"),
        None,
    )
    .await;

    app.advance(Duration::minutes(30));

    let swept = app.request("POST", "/api/admin/sweep", None).await;
    assert_eq!(swept.data()["expired"], 0);
    assert_eq!(swept.data()["skipped_payment_window"], 1);

    let completed = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/complete"),
            Some(json!({ "external_ref": "tx-slow" })),
        )
        .await;
    assert_eq!(completed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_closed_payment_window_lets_sweep_expire() {
    let app = TestApp::with_units(1).await;
    let id = app.allocate("alice").await;
    app.request(
        "POST",
        &format!("/api/reservations/{id}/payment-window/open"),
        None,
    )
    .await;
    let closed = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/payment-window/close"),
            None,
        )
        .await;
    assert_eq!(closed.status, StatusCode::OK);
    assert!(closed.data()["payment_window_closed_at"].is_string());

    app.advance(Duration::minutes(21));
    let swept = app.request("POST", "/api/admin/sweep", None).await;
    assert_eq!(swept.data()["expired"], 1);
}

#[tokio::test]
async fn test_release_and_cancel() {
    let app = TestApp::with_units(2).await;
    let id = app.allocate("alice").await;

    let released = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/release"),
            Some(json!({ "reason": "cancelled" })),
        )
        .await;
    assert_eq!(released.status, StatusCode::OK);
    assert_eq!(released.data()["status"], "cancelled");

    let twice = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/release"),
            Some(json!({})),
        )
        .await;
    assert_eq!(twice.status, StatusCode::CONFLICT);

    let unknown_reason = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/release"),
            Some(json!({ "reason": "stolen" })),
        )
        .await;
    assert_eq!(unknown_reason.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_reason.error_code(), Some("VALIDATION_ERROR"));

    app.allocate("bob").await;
    let cancelled = app.request("POST", "/api/holders/bob/cancel", None).await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.data()["status"], "cancelled");

    let stats = app.request("GET", "/api/pool/stats", None).await;
    assert_eq!(stats.data()["available"], 2);
}

#[tokio::test]
async fn test_unknown_and_malformed_reservation_ids() {
    let app = TestApp::with_units(1).await;

    let missing = app
        .request(
            "POST",
            "/api/reservations/0190a0f4-0000-7000-8000-000000000000/payment-window/open",
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_code(), Some("NOT_FOUND"));

    let malformed = app
        .request("POST", "/api/reservations/not-a-uuid/release", Some(json!({})))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_countdown_tracks_clock() {
    let app = TestApp::with_units(1).await;
    app.allocate("alice").await;

    let active = app.request("GET", "/api/holders/alice/active", None).await;
    assert_eq!(active.data()["remaining_ms"], 20 * 60 * 1000);
    assert_eq!(active.data()["is_payment_window_open"], false);

    app.advance(Duration::minutes(5));
    let active = app.request("GET", "/api/holders/alice/active", None).await;
    assert_eq!(active.data()["remaining_ms"], 15 * 60 * 1000);
    assert_eq!(active.data()["is_expired"], false);
}

#[tokio::test]
async fn test_list_reservations_by_status() {
    let app = TestApp::with_units(3).await;
    let id = app.allocate("alice").await;
    app.allocate("bob").await;
    app.request(
        "POST",
        &format!("/api/reservations/{id}/release"),
        Some(json!({})),
    )
    .await;

    let all = app.request("GET", "/api/reservations", None).await;
    assert_eq!(all.data().as_array().unwrap().len(), 2);

    let active = app
        .request("GET", "/api/reservations?status=active", None)
        .await;
    let active = active.data().as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["holder_id"], "bob");

    let invalid = app
        .request("GET", "/api/reservations?status=pending", None)
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}
