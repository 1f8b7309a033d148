//! Reservation entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use claimpool_core::types::{HolderId, ReservationId, UnitId};

use super::status::ReservationStatus;
use crate::unit::ResourceUnit;

/// A time-bounded, exclusive claim linking one holder to one unit.
///
/// `expires_at` is fixed at creation. The payment window timestamps are
/// advisory: they only stop the sweeper from expiring the reservation and
/// never move the deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// The reserved unit.
    pub unit_id: UnitId,
    /// Ordinal of the reserved unit, copied at creation.
    pub unit_ordinal: i64,
    /// Holder on whose behalf the reservation was made.
    pub holder_id: HolderId,
    /// Creation time.
    pub reserved_at: DateTime<Utc>,
    /// Absolute deadline.
    pub expires_at: DateTime<Utc>,
    /// When the external payment window was last opened.
    pub payment_window_opened_at: Option<DateTime<Utc>>,
    /// When the external payment window was closed.
    pub payment_window_closed_at: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: ReservationStatus,
    /// Payment reference recorded on completion.
    pub external_ref: Option<String>,
    /// When the reservation reached a terminal status.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Create an active reservation of `unit` for `holder`.
    pub fn new(
        unit: &ResourceUnit,
        holder_id: HolderId,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            unit_id: unit.id,
            unit_ordinal: unit.ordinal,
            holder_id,
            reserved_at: now,
            expires_at: now + timeout,
            payment_window_opened_at: None,
            payment_window_closed_at: None,
            status: ReservationStatus::Active,
            external_ref: None,
            ended_at: None,
        }
    }

    /// Check whether the reservation still holds its unit.
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// Whether the holder is currently inside the payment flow.
    pub fn is_payment_window_open(&self) -> bool {
        self.payment_window_opened_at.is_some() && self.payment_window_closed_at.is_none()
    }

    /// Time left until the deadline, clamped at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Whether the deadline has passed.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Whether the sweeper should expire this reservation at `now`.
    pub fn is_sweepable(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.is_active() && self.expires_at < now - grace && !self.is_payment_window_open()
    }
}
