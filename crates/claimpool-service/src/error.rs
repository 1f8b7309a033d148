//! Domain outcomes of the reservation engine.

use thiserror::Error;

use claimpool_core::error::AppError;
use claimpool_core::types::{HolderId, ReservationId};
use claimpool_entity::ReservationStatus;

/// Errors returned by every engine operation.
///
/// Capacity and conflict outcomes are expected results of normal traffic,
/// not faults. `Store` wraps infrastructure failures.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Every unit is held by an active reservation; one may free up later.
    #[error("all units are currently reserved, try again later")]
    TemporarilyUnavailable,

    /// Every unit has been sold.
    #[error("all units have been sold")]
    PermanentlyUnavailable,

    /// The holder has already completed a claim.
    #[error("holder {0} has already claimed a unit")]
    AlreadyClaimed(HolderId),

    /// A concurrent request took the selected unit first.
    #[error("unit #{ordinal} was taken by a concurrent request")]
    RaceLost {
        /// Ordinal of the contested unit.
        ordinal: i64,
    },

    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The reservation has already reached a terminal status.
    #[error("reservation {id} is {status}, not active")]
    NotActive {
        /// The reservation.
        id: ReservationId,
        /// Its current status.
        status: ReservationStatus,
    },

    /// A multi-record write failed and its compensation failed too.
    #[error("integrity failure: {0}")]
    Integrity(String),

    /// Store or infrastructure failure.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl ReservationError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RaceLost { .. } | Self::TemporarilyUnavailable)
    }

    /// Whether this is a pool capacity outcome.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::TemporarilyUnavailable | Self::PermanentlyUnavailable
        )
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> String {
        match self {
            Self::TemporarilyUnavailable => "TEMPORARILY_UNAVAILABLE".to_string(),
            Self::PermanentlyUnavailable => "PERMANENTLY_UNAVAILABLE".to_string(),
            Self::AlreadyClaimed(_) => "ALREADY_CLAIMED".to_string(),
            Self::RaceLost { .. } => "RACE_LOST".to_string(),
            Self::NotFound(_) => "NOT_FOUND".to_string(),
            Self::NotActive { .. } => "NOT_ACTIVE".to_string(),
            Self::Integrity(_) => "INTEGRITY".to_string(),
            Self::Store(e) => e.kind.to_string(),
        }
    }

    pub(crate) fn reservation_not_found(id: ReservationId) -> Self {
        Self::NotFound(format!("reservation {id}"))
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        let message = err.to_string();
        match err {
            ReservationError::Store(inner) => inner,
            ReservationError::TemporarilyUnavailable => AppError::service_unavailable(message),
            ReservationError::PermanentlyUnavailable
            | ReservationError::AlreadyClaimed(_)
            | ReservationError::RaceLost { .. } => AppError::conflict(message),
            ReservationError::NotFound(_) => AppError::not_found(message),
            ReservationError::NotActive { .. } => AppError::invalid_state(message),
            ReservationError::Integrity(_) => AppError::integrity(message),
        }
    }
}

/// Result alias for engine operations.
pub type ReservationResult<T> = Result<T, ReservationError>;
