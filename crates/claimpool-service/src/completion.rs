//! Completion engine: turns a paid reservation into a sale.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use claimpool_core::traits::{AttributionSource, Clock};
use claimpool_core::types::{HolderId, ReservationId};
use claimpool_database::{ReservationStore, UnitSale, UnitStore};
use claimpool_entity::{Reservation, ReservationStatus, ResourceUnit};

use crate::error::{ReservationError, ReservationResult};

/// How the reservation to complete is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationTarget {
    /// By reservation id.
    Id(ReservationId),
    /// By the holder's sole active reservation.
    Holder(HolderId),
}

impl fmt::Display for ReservationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "reservation {id}"),
            Self::Holder(holder) => write!(f, "active reservation for holder {holder}"),
        }
    }
}

/// A finished sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The completed reservation.
    pub reservation: Reservation,
    /// The sold unit.
    pub unit: ResourceUnit,
}

/// Completes reservations once payment has been confirmed.
#[derive(Debug, Clone)]
pub struct CompletionService {
    units: Arc<dyn UnitStore>,
    reservations: Arc<dyn ReservationStore>,
    attribution: Arc<dyn AttributionSource>,
    clock: Arc<dyn Clock>,
}

impl CompletionService {
    /// Creates a new completion service.
    pub fn new(
        units: Arc<dyn UnitStore>,
        reservations: Arc<dyn ReservationStore>,
        attribution: Arc<dyn AttributionSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            units,
            reservations,
            attribution,
            clock,
        }
    }

    /// Complete a reservation, marking its unit sold to the holder.
    ///
    /// A reservation whose unit is not linked yet is still being allocated
    /// and yields `RaceLost`. Otherwise the reservation moves
    /// `Active → Completed` first. If the unit write then fails, the
    /// reservation is put back to `Active`; if that also fails the error is
    /// `Integrity`.
    pub async fn complete(
        &self,
        target: ReservationTarget,
        external_ref: Option<&str>,
    ) -> ReservationResult<Completion> {
        let now = self.clock.now();
        let reservation = self.resolve(&target).await?;
        let id = reservation.id;
        let holder = reservation.holder_id.clone();

        // The allocator inserts the reservation before it links the unit.
        let unit_linked = self
            .units
            .find_by_id(reservation.unit_id)
            .await?
            .is_some_and(|unit| unit.is_reserved_by(id));
        if !unit_linked {
            warn!(
                reservation_id = %id,
                unit_ordinal = reservation.unit_ordinal,
                "Completion arrived before the unit was linked"
            );
            return Err(ReservationError::RaceLost {
                ordinal: reservation.unit_ordinal,
            });
        }

        let already_completed = self
            .reservations
            .find_completed_by_holder(&holder)
            .await?
            .is_some();
        if already_completed || self.units.find_sold_to(&holder).await?.is_some() {
            warn!(holder_id = %holder, reservation_id = %id, "Holder has already claimed");
            return Err(ReservationError::AlreadyClaimed(holder));
        }

        let attribution_snapshot = match self.attribution.snapshot(&holder).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(holder_id = %holder, error = %e, "Attribution lookup failed, recording none");
                None
            }
        };

        match self
            .reservations
            .finish(id, ReservationStatus::Completed, now, external_ref)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                let status = self.current_status(id).await?;
                warn!(reservation_id = %id, %status, "Completion lost to a concurrent transition");
                return Err(ReservationError::NotActive { id, status });
            }
            Err(e) if e.is_conflict() => {
                warn!(holder_id = %holder, reservation_id = %id, "Concurrent claim already completed");
                return Err(ReservationError::AlreadyClaimed(holder));
            }
            Err(e) => return Err(e.into()),
        }

        let sale = UnitSale {
            holder: holder.clone(),
            sold_at: now,
            attribution_snapshot,
        };
        let failure = match self.units.mark_sold(reservation.unit_id, id, &sale).await {
            Ok(true) => None,
            Ok(false) => Some(ReservationError::Integrity(format!(
                "unit #{} is not reserved by reservation {id}",
                reservation.unit_ordinal
            ))),
            Err(e) if e.is_conflict() => Some(ReservationError::AlreadyClaimed(holder.clone())),
            Err(e) => Some(ReservationError::Store(e)),
        };

        if let Some(failure) = failure {
            return Err(self.compensate(&reservation, failure).await);
        }

        info!(
            reservation_id = %id,
            holder_id = %holder,
            unit_ordinal = reservation.unit_ordinal,
            external_ref = external_ref.unwrap_or_default(),
            "Reservation completed"
        );

        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReservationError::reservation_not_found(id))?;
        let unit = self
            .units
            .find_by_id(reservation.unit_id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("unit {}", reservation.unit_id)))?;
        Ok(Completion { reservation, unit })
    }

    async fn resolve(&self, target: &ReservationTarget) -> ReservationResult<Reservation> {
        match target {
            ReservationTarget::Id(id) => {
                let reservation = self
                    .reservations
                    .find_by_id(*id)
                    .await?
                    .ok_or_else(|| ReservationError::reservation_not_found(*id))?;
                if !reservation.is_active() {
                    return Err(ReservationError::NotActive {
                        id: *id,
                        status: reservation.status,
                    });
                }
                Ok(reservation)
            }
            ReservationTarget::Holder(holder) => self
                .reservations
                .find_active_by_holder(holder)
                .await?
                .ok_or_else(|| ReservationError::NotFound(target.to_string())),
        }
    }

    async fn current_status(&self, id: ReservationId) -> ReservationResult<ReservationStatus> {
        self.reservations
            .find_by_id(id)
            .await?
            .map(|r| r.status)
            .ok_or_else(|| ReservationError::reservation_not_found(id))
    }

    /// Undo the `Completed` transition after a failed unit write.
    async fn compensate(
        &self,
        reservation: &Reservation,
        failure: ReservationError,
    ) -> ReservationError {
        let id = reservation.id;
        match self.reservations.reopen(id).await {
            Ok(true) => {
                warn!(
                    reservation_id = %id,
                    error = %failure,
                    "Unit sale failed, reservation restored to active"
                );
                failure
            }
            Ok(false) => {
                error!(
                    reservation_id = %id,
                    error = %failure,
                    "Unit sale failed and reservation was no longer completed"
                );
                ReservationError::Integrity(format!(
                    "reservation {id} completed without selling unit #{}: {failure}",
                    reservation.unit_ordinal
                ))
            }
            Err(e) => {
                error!(
                    reservation_id = %id,
                    error = %failure,
                    compensation_error = %e,
                    "Unit sale failed and reservation could not be restored"
                );
                ReservationError::Integrity(format!(
                    "reservation {id} completed without selling unit #{}: {failure}; restore failed: {e}",
                    reservation.unit_ordinal
                ))
            }
        }
    }
}
