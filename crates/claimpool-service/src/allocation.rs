//! Allocation engine: hands out the lowest available unit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use claimpool_core::config::ReservationConfig;
use claimpool_core::traits::Clock;
use claimpool_core::types::HolderId;
use claimpool_database::{ReservationStore, UnitStore};
use claimpool_entity::{Reservation, ReservationStatus, ResourceUnit, UnitStatus};

use crate::error::{ReservationError, ReservationResult};
use crate::sweep::ExpirySweeper;

/// A reservation handed to a holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// The active reservation.
    pub reservation: Reservation,
    /// The reserved unit.
    pub unit: ResourceUnit,
    /// `true` when the holder already had this reservation before the call.
    pub is_existing: bool,
}

/// Allocates units to holders.
#[derive(Debug, Clone)]
pub struct AllocationService {
    units: Arc<dyn UnitStore>,
    reservations: Arc<dyn ReservationStore>,
    sweeper: ExpirySweeper,
    clock: Arc<dyn Clock>,
    config: ReservationConfig,
}

impl AllocationService {
    /// Creates a new allocation service.
    pub fn new(
        units: Arc<dyn UnitStore>,
        reservations: Arc<dyn ReservationStore>,
        sweeper: ExpirySweeper,
        clock: Arc<dyn Clock>,
        config: ReservationConfig,
    ) -> Self {
        Self {
            units,
            reservations,
            sweeper,
            clock,
            config,
        }
    }

    /// Reserve a unit for `holder`.
    ///
    /// Returns the holder's existing active reservation unchanged when there
    /// is one. Otherwise picks the lowest-ordinal available unit and writes
    /// the reservation and the unit's `Available → Reserved` swap; if the
    /// unit write does not go through, the reservation is deleted again.
    pub async fn allocate(&self, holder: &HolderId) -> ReservationResult<Allocation> {
        let now = self.clock.now();

        if self.config.sweep_on_allocate {
            if let Err(e) = self.sweeper.sweep_report(now).await {
                warn!(error = %e, "Pre-allocation sweep failed, continuing");
            }
        }

        if let Some(existing) = self.existing_allocation(holder).await? {
            return Ok(existing);
        }

        let already_completed = self
            .reservations
            .find_completed_by_holder(holder)
            .await?
            .is_some();
        if already_completed || self.units.find_sold_to(holder).await?.is_some() {
            debug!(holder_id = %holder, "Allocation refused, holder has already claimed");
            return Err(ReservationError::AlreadyClaimed(holder.clone()));
        }

        let candidate = match self.units.find_lowest_available().await? {
            Some(unit) => unit,
            None => {
                let reserved = self.units.count_by_status(UnitStatus::Reserved).await?;
                return Err(if reserved > 0 {
                    ReservationError::TemporarilyUnavailable
                } else {
                    ReservationError::PermanentlyUnavailable
                });
            }
        };

        let unit = self
            .units
            .find_by_id(candidate.id)
            .await?
            .filter(ResourceUnit::is_available)
            .ok_or(ReservationError::RaceLost {
                ordinal: candidate.ordinal,
            })?;

        let reservation = Reservation::new(&unit, holder.clone(), now, self.config.timeout());
        if let Err(e) = self.reservations.insert(&reservation).await {
            if !e.is_conflict() {
                return Err(e.into());
            }
            // The holder or the unit gained an active reservation in between.
            if let Some(existing) = self.existing_allocation(holder).await? {
                return Ok(existing);
            }
            return Err(ReservationError::RaceLost {
                ordinal: unit.ordinal,
            });
        }

        let failure = match self
            .units
            .mark_reserved(unit.id, reservation.id, reservation.reserved_at, reservation.expires_at)
            .await
        {
            Ok(true) => None,
            Ok(false) => Some(ReservationError::RaceLost {
                ordinal: unit.ordinal,
            }),
            Err(e) => Some(ReservationError::Store(e)),
        };

        if let Some(failure) = failure {
            return Err(self.compensate(&reservation, failure).await);
        }

        self.confirm_still_active(&reservation).await?;

        info!(
            reservation_id = %reservation.id,
            holder_id = %holder,
            unit_ordinal = unit.ordinal,
            expires_at = %reservation.expires_at,
            "Unit reserved"
        );

        let unit = self
            .units
            .find_by_id(unit.id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("unit {}", unit.id)))?;
        Ok(Allocation {
            reservation,
            unit,
            is_existing: false,
        })
    }

    /// [`allocate`](Self::allocate), retrying lost races up to the
    /// configured limit.
    pub async fn allocate_with_retry(&self, holder: &HolderId) -> ReservationResult<Allocation> {
        let mut attempt = 0;
        loop {
            match self.allocate(holder).await {
                Err(ReservationError::RaceLost { ordinal })
                    if attempt < self.config.race_retry_limit =>
                {
                    attempt += 1;
                    warn!(holder_id = %holder, unit_ordinal = ordinal, attempt, "Allocation race lost, retrying");
                }
                result => return result,
            }
        }
    }

    async fn existing_allocation(&self, holder: &HolderId) -> ReservationResult<Option<Allocation>> {
        let Some(reservation) = self.reservations.find_active_by_holder(holder).await? else {
            return Ok(None);
        };
        let unit = self
            .units
            .find_by_id(reservation.unit_id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("unit {}", reservation.unit_id)))?;
        debug!(reservation_id = %reservation.id, holder_id = %holder, "Returning existing reservation");
        Ok(Some(Allocation {
            reservation,
            unit,
            is_existing: true,
        }))
    }

    /// Re-read the reservation once its unit is linked.
    ///
    /// A release that ran between the insert and the unit swap found no
    /// linked unit to free, so the unit is handed back here. A completion
    /// only proceeds once it sees the link, so a `Completed` reservation
    /// keeps its unit.
    async fn confirm_still_active(&self, reservation: &Reservation) -> ReservationResult<()> {
        let id = reservation.id;
        let status = match self.reservations.find_by_id(id).await? {
            Some(current) if current.is_active() => return Ok(()),
            Some(current) => Some(current.status),
            None => None,
        };

        if status != Some(ReservationStatus::Completed) {
            let now = self.clock.now();
            match self.units.mark_available(reservation.unit_id, id, now).await {
                Ok(freed) => {
                    warn!(
                        reservation_id = %id,
                        unit_ordinal = reservation.unit_ordinal,
                        freed,
                        "Reservation ended while its unit was being reserved, unit returned"
                    );
                }
                Err(e) => {
                    error!(
                        reservation_id = %id,
                        unit_ordinal = reservation.unit_ordinal,
                        error = %e,
                        "Reservation ended while its unit was being reserved and the unit could not be freed"
                    );
                    return Err(ReservationError::Integrity(format!(
                        "unit #{} is reserved by ended reservation {id}: {e}",
                        reservation.unit_ordinal
                    )));
                }
            }
        }

        Err(match status {
            Some(status) => ReservationError::NotActive { id, status },
            None => ReservationError::reservation_not_found(id),
        })
    }

    /// Delete a reservation whose unit could not be reserved.
    async fn compensate(
        &self,
        reservation: &Reservation,
        failure: ReservationError,
    ) -> ReservationError {
        match self.reservations.delete(reservation.id).await {
            Ok(_) => {
                warn!(
                    reservation_id = %reservation.id,
                    unit_ordinal = reservation.unit_ordinal,
                    error = %failure,
                    "Unit reservation failed, reservation removed"
                );
                failure
            }
            Err(e) => {
                error!(
                    reservation_id = %reservation.id,
                    unit_ordinal = reservation.unit_ordinal,
                    error = %failure,
                    compensation_error = %e,
                    "Unit reservation failed and reservation could not be removed"
                );
                ReservationError::Integrity(format!(
                    "reservation {} exists without its unit #{}: {failure}; delete failed: {e}",
                    reservation.id, reservation.unit_ordinal
                ))
            }
        }
    }
}
