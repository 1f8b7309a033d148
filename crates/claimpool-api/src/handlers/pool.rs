//! Pool read handlers.

use axum::Json;
use axum::extract::State;

use claimpool_entity::ResourceUnit;

use crate::dto::response::{ApiResponse, PoolStatsResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/pool/stats
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PoolStatsResponse>>, ApiError> {
    let stats = state.engine.pool_stats().await?;
    Ok(Json(ApiResponse::ok(stats.into())))
}

/// GET /api/pool/units
pub async fn units(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ResourceUnit>>>, ApiError> {
    let units = state.engine.list_units().await?;
    Ok(Json(ApiResponse::ok(units)))
}
