//! Operator handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use claimpool_service::SweepReport;

use crate::dto::request::SeedPoolRequest;
use crate::dto::response::{ApiResponse, SeedPoolResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /api/admin/sweep
pub async fn sweep(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SweepReport>>, ApiError> {
    let report = state.engine.sweep_report(state.engine.now()).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/admin/pool/seed
pub async fn seed_pool(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SeedPoolRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SeedPoolResponse>>), ApiError> {
    let inserted = state
        .engine
        .populate(req.first_ordinal, req.count, req.label_prefix.as_deref())
        .await?;
    info!(
        first_ordinal = req.first_ordinal,
        requested = req.count,
        inserted,
        "Pool seeded via API"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(SeedPoolResponse { inserted })),
    ))
}
