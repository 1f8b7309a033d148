//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (status, store) = match state.stores.health_check().await {
        Ok(true) => ("ok", "connected"),
        Ok(false) => ("degraded", "unhealthy"),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            ("degraded", "unreachable")
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: store.to_string(),
    }))
}
