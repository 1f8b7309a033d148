//! Payment window tracking.

use std::sync::Arc;

use tracing::info;

use claimpool_core::traits::Clock;
use claimpool_core::types::ReservationId;
use claimpool_database::ReservationStore;
use claimpool_entity::Reservation;

use crate::error::{ReservationError, ReservationResult};

/// Records when a holder enters and leaves the external payment flow.
///
/// An open window only shields the reservation from the sweeper. The
/// deadline is never moved.
#[derive(Debug, Clone)]
pub struct PaymentWindowTracker {
    reservations: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
}

impl PaymentWindowTracker {
    /// Creates a new tracker.
    pub fn new(reservations: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reservations,
            clock,
        }
    }

    /// Mark the payment window as opened.
    pub async fn mark_opened(&self, id: ReservationId) -> ReservationResult<Reservation> {
        let updated = self
            .reservations
            .open_payment_window(id, self.clock.now())
            .await?;
        let reservation = self.after_update(id, updated).await?;
        info!(reservation_id = %id, "Payment window opened");
        Ok(reservation)
    }

    /// Mark the payment window as closed.
    pub async fn mark_closed(&self, id: ReservationId) -> ReservationResult<Reservation> {
        let updated = self
            .reservations
            .close_payment_window(id, self.clock.now())
            .await?;
        let reservation = self.after_update(id, updated).await?;
        info!(reservation_id = %id, "Payment window closed");
        Ok(reservation)
    }

    async fn after_update(
        &self,
        id: ReservationId,
        updated: bool,
    ) -> ReservationResult<Reservation> {
        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReservationError::reservation_not_found(id))?;
        if !updated {
            return Err(ReservationError::NotActive {
                id,
                status: reservation.status,
            });
        }
        Ok(reservation)
    }
}
