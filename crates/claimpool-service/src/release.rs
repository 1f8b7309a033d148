//! Release engine: returns a reserved unit to the pool.

use std::sync::Arc;

use tracing::{error, info, warn};

use claimpool_core::traits::Clock;
use claimpool_core::types::{HolderId, ReservationId};
use claimpool_database::{ReservationStore, UnitStore};
use claimpool_entity::{ReleaseReason, Reservation};

use crate::error::{ReservationError, ReservationResult};

/// Ends active reservations as cancelled or expired and frees their units.
#[derive(Debug, Clone)]
pub struct ReleaseService {
    units: Arc<dyn UnitStore>,
    reservations: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
}

impl ReleaseService {
    /// Creates a new release service.
    pub fn new(
        units: Arc<dyn UnitStore>,
        reservations: Arc<dyn ReservationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            units,
            reservations,
            clock,
        }
    }

    /// Release a reservation.
    ///
    /// The reservation moves `Active → reason` first; only the caller that
    /// wins that transition touches the unit, and only if the unit is still
    /// reserved by this reservation.
    pub async fn release(
        &self,
        id: ReservationId,
        reason: ReleaseReason,
    ) -> ReservationResult<Reservation> {
        let now = self.clock.now();
        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReservationError::reservation_not_found(id))?;

        if !reservation.is_active() {
            return Err(ReservationError::NotActive {
                id,
                status: reservation.status,
            });
        }

        let ended = self
            .reservations
            .finish(id, reason.status(), now, None)
            .await?;
        if !ended {
            let status = self
                .reservations
                .find_by_id(id)
                .await?
                .map(|r| r.status)
                .ok_or_else(|| ReservationError::reservation_not_found(id))?;
            warn!(reservation_id = %id, %status, "Release lost to a concurrent transition");
            return Err(ReservationError::NotActive { id, status });
        }

        match self
            .units
            .mark_available(reservation.unit_id, id, now)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    reservation_id = %id,
                    unit_ordinal = reservation.unit_ordinal,
                    "Unit was not reserved by this reservation; left untouched"
                );
            }
            Err(e) => {
                error!(
                    reservation_id = %id,
                    unit_ordinal = reservation.unit_ordinal,
                    error = %e,
                    "Reservation ended but its unit could not be freed"
                );
                return Err(ReservationError::Integrity(format!(
                    "reservation {id} is {} but unit #{} is still reserved: {e}",
                    reason.status(),
                    reservation.unit_ordinal
                )));
            }
        }

        info!(
            reservation_id = %id,
            holder_id = %reservation.holder_id,
            unit_ordinal = reservation.unit_ordinal,
            %reason,
            "Reservation released"
        );

        self.reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReservationError::reservation_not_found(id))
    }

    /// Cancel the holder's active reservation.
    pub async fn cancel_for_holder(&self, holder: &HolderId) -> ReservationResult<Reservation> {
        let reservation = self
            .reservations
            .find_active_by_holder(holder)
            .await?
            .ok_or_else(|| {
                ReservationError::NotFound(format!("active reservation for holder {holder}"))
            })?;
        self.release(reservation.id, ReleaseReason::Cancelled).await
    }
}
