//! Typed path parameter helpers.

use claimpool_core::error::AppError;
use claimpool_core::types::{HolderId, ReservationId};

/// Parses a reservation id from a path segment.
pub fn parse_reservation_id(s: &str) -> Result<ReservationId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid reservation id: {s}")))
}

/// Parses a holder id from a path segment.
pub fn parse_holder(s: &str) -> Result<HolderId, AppError> {
    HolderId::parse(s)
}
