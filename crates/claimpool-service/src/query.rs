//! Read-side queries over reservations and the pool.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use claimpool_core::traits::Clock;
use claimpool_core::types::HolderId;
use claimpool_database::{ReservationStore, UnitStore};
use claimpool_entity::{PoolStats, Reservation, ReservationStatus, ResourceUnit};

use crate::error::{ReservationError, ReservationResult};

/// A holder's active reservation as seen at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveReservation {
    /// The reservation.
    pub reservation: Reservation,
    /// The reserved unit.
    pub unit: ResourceUnit,
    /// Milliseconds until the deadline, never negative.
    pub remaining_ms: i64,
    /// Whether the deadline has passed (the sweep may not have run yet).
    pub is_expired: bool,
    /// Whether the holder is inside the payment flow.
    pub is_payment_window_open: bool,
}

/// Reservation and pool queries.
#[derive(Debug, Clone)]
pub struct ReservationQueryService {
    units: Arc<dyn UnitStore>,
    reservations: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
}

impl ReservationQueryService {
    /// Creates a new query service.
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

    /// The holder's active reservation with its countdown.
    pub async fn get_active(
        &self,
        holder: &HolderId,
    ) -> ReservationResult<Option<ActiveReservation>> {
        let now = self.clock.now();
        let Some(reservation) = self.reservations.find_active_by_holder(holder).await? else {
            return Ok(None);
        };
        let unit = self
            .units
            .find_by_id(reservation.unit_id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("unit {}", reservation.unit_id)))?;

        Ok(Some(ActiveReservation {
            remaining_ms: reservation.remaining(now).num_milliseconds(),
            is_expired: reservation.is_past_deadline(now),
            is_payment_window_open: reservation.is_payment_window_open(),
            reservation,
            unit,
        }))
    }

    /// Every reservation of the holder, newest first.
    pub async fn holder_history(&self, holder: &HolderId) -> ReservationResult<Vec<Reservation>> {
        Ok(self.reservations.find_by_holder(holder).await?)
    }

    /// Whether the holder has completed a claim.
    pub async fn has_claimed(&self, holder: &HolderId) -> ReservationResult<bool> {
        if self
            .reservations
            .find_completed_by_holder(holder)
            .await?
            .is_some()
        {
            return Ok(true);
        }
        Ok(self.units.find_sold_to(holder).await?.is_some())
    }

    /// Reservations filtered by status, newest first.
    pub async fn list_reservations(
        &self,
        status: Option<ReservationStatus>,
    ) -> ReservationResult<Vec<Reservation>> {
        Ok(self.reservations.find_by_status(status).await?)
    }

    /// Unit counts per status.
    pub async fn pool_stats(&self) -> ReservationResult<PoolStats> {
        Ok(self.units.stats().await?)
    }

    /// Every unit by ordinal.
    pub async fn list_units(&self) -> ReservationResult<Vec<ResourceUnit>> {
        Ok(self.units.list().await?)
    }
}
