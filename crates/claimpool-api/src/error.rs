//! Maps engine and application errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use claimpool_core::error::{AppError, ErrorKind};
use claimpool_service::ReservationError;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Any error a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Infrastructure, validation, or configuration error.
    App(AppError),
    /// Reservation engine outcome.
    Reservation(ReservationError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::Store(inner) => Self::App(inner),
            other => Self::Reservation(other),
        }
    }
}

fn app_status(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::InvalidState => (StatusCode::CONFLICT, "INVALID_STATE"),
        ErrorKind::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        ErrorKind::Integrity => (StatusCode::INTERNAL_SERVER_ERROR, "INTEGRITY"),
        ErrorKind::Database => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        ErrorKind::Configuration | ErrorKind::Serialization | ErrorKind::Internal => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

fn reservation_status(err: &ReservationError) -> StatusCode {
    match err {
        ReservationError::TemporarilyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ReservationError::PermanentlyUnavailable => StatusCode::GONE,
        ReservationError::AlreadyClaimed(_)
        | ReservationError::RaceLost { .. }
        | ReservationError::NotActive { .. } => StatusCode::CONFLICT,
        ReservationError::NotFound(_) => StatusCode::NOT_FOUND,
        ReservationError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReservationError::Store(e) => app_status(e.kind).0,
    }
}

impl ApiError {
    /// HTTP status and error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, String) {
        match self {
            Self::App(e) => {
                let (status, code) = app_status(e.kind);
                (status, code.to_string())
            }
            Self::Reservation(e) => (reservation_status(e), e.code()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_code();
        let message = match &self {
            Self::App(e) => e.message.clone(),
            Self::Reservation(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %error, message = %message, "Request failed");
        }

        (status, Json(ApiErrorResponse { error, message })).into_response()
    }
}
