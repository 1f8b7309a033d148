//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use claimpool_api::AppState;
use claimpool_core::config::{AppConfig, StoreBackend};
use claimpool_core::traits::ManualClock;
use claimpool_database::StoreSet;
use claimpool_service::ReservationEngine;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Clock driving every reservation deadline
    pub clock: Arc<ManualClock>,
    /// Engine behind the router, for direct setup
    pub engine: ReservationEngine,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application over an in-memory pool of `units` units
    pub async fn with_units(units: u32) -> Self {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Memory;
        config.store.seed_units = units;
        config.worker.enabled = false;

        let stores = StoreSet::open(&config)
            .await
            .expect("Failed to open memory store");
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let engine =
            ReservationEngine::from_stores(&stores, clock.clone(), config.reservation.clone());

        let state = AppState::new(Arc::new(config.clone()), stores, engine.clone());
        let router = claimpool_api::build_router(state);

        Self {
            router,
            clock,
            engine,
            config,
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Allocate over HTTP and return the reservation id
    pub async fn allocate(&self, holder: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/reservations",
                Some(serde_json::json!({ "holder_id": holder })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Allocation failed: {:?}",
            response.body
        );
        response.data()["reservation"]["id"]
            .as_str()
            .expect("No reservation id in allocation response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of an error body
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"].as_str()
    }
}
