//! Reservation handlers: allocation, payment window, completion, release.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use claimpool_core::error::AppError;
use claimpool_entity::{Reservation, ReservationStatus};
use claimpool_service::{Allocation, Completion, ReservationTarget};

use crate::dto::request::{
    AllocateRequest, CompleteRequest, ListReservationsQuery, ReleaseRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::extractors::path::{parse_holder, parse_reservation_id};
use crate::state::AppState;

/// POST /api/reservations
///
/// Returns `201 Created` for a new reservation and `200 OK` when the
/// holder's existing active reservation is handed back.
pub async fn allocate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AllocateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Allocation>>), ApiError> {
    let holder = parse_holder(&req.holder_id)?;
    let allocation = state.engine.allocate_with_retry(&holder).await?;
    let status = if allocation.is_existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(ApiResponse::ok(allocation))))
}

/// GET /api/reservations?status=active
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<ApiResponse<Vec<Reservation>>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ReservationStatus>().map_err(AppError::validation))
        .transpose()?;
    let reservations = state.engine.list_reservations(status).await?;
    Ok(Json(ApiResponse::ok(reservations)))
}

/// POST /api/reservations/{id}/payment-window/open
pub async fn open_payment_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let reservation = state.engine.mark_payment_window_opened(id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/{id}/payment-window/close
pub async fn close_payment_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let reservation = state.engine.mark_payment_window_closed(id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CompleteRequest>,
) -> Result<Json<ApiResponse<Completion>>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let completion = state
        .engine
        .complete(ReservationTarget::Id(id), req.external_ref.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(completion)))
}

/// POST /api/reservations/{id}/release
pub async fn release(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReleaseRequest>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let reservation = state.engine.release(id, req.reason).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}
