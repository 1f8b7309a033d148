//! Holder-scoped handlers.

use axum::Json;
use axum::extract::{Path, State};

use claimpool_entity::Reservation;
use claimpool_service::{ActiveReservation, Completion, ReservationTarget};

use crate::dto::request::{CompleteRequest, SetProfileRequest};
use crate::dto::response::{ApiResponse, HistoryResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::extractors::path::parse_holder;
use crate::state::AppState;

/// GET /api/holders/{holder_id}/active
///
/// `data` is `null` when the holder has no active reservation.
pub async fn get_active(
    State(state): State<AppState>,
    Path(holder_id): Path<String>,
) -> Result<Json<ApiResponse<Option<ActiveReservation>>>, ApiError> {
    let holder = parse_holder(&holder_id)?;
    let active = state.engine.get_active(&holder).await?;
    Ok(Json(ApiResponse::ok(active)))
}

/// POST /api/holders/{holder_id}/complete
///
/// Payment webhooks know the buyer but not the reservation id.
pub async fn complete(
    State(state): State<AppState>,
    Path(holder_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CompleteRequest>,
) -> Result<Json<ApiResponse<Completion>>, ApiError> {
    let holder = parse_holder(&holder_id)?;
    let completion = state
        .engine
        .complete(ReservationTarget::Holder(holder), req.external_ref.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(completion)))
}

/// POST /api/holders/{holder_id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Path(holder_id): Path<String>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let holder = parse_holder(&holder_id)?;
    let reservation = state.engine.cancel_for_holder(&holder).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// GET /api/holders/{holder_id}/history
pub async fn history(
    State(state): State<AppState>,
    Path(holder_id): Path<String>,
) -> Result<Json<ApiResponse<HistoryResponse>>, ApiError> {
    let holder = parse_holder(&holder_id)?;
    let reservations = state.engine.holder_history(&holder).await?;
    let has_claimed = state.engine.has_claimed(&holder).await?;
    Ok(Json(ApiResponse::ok(HistoryResponse {
        holder_id: holder.to_string(),
        has_claimed,
        reservations,
    })))
}

/// PUT /api/holders/{holder_id}/profile
pub async fn set_profile(
    State(state): State<AppState>,
    Path(holder_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SetProfileRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let holder = parse_holder(&holder_id)?;
    state
        .engine
        .set_display_name(&holder, req.display_name.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({
        "message": "Profile updated"
    }))))
}
