//! Resource unit entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use claimpool_core::types::{HolderId, ReservationId, UnitId};

use super::status::UnitStatus;

/// One uniquely numbered, non-fungible item in the allocatable pool.
///
/// The `reserved_at`/`expires_at` pair mirrors the active reservation so
/// that pool listings do not need a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ResourceUnit {
    /// Unique unit identifier.
    pub id: UnitId,
    /// Allocation priority; the lowest available ordinal is handed out first.
    pub ordinal: i64,
    /// Optional display label.
    pub label: Option<String>,
    /// Current allocation status.
    pub status: UnitStatus,
    /// Reservation currently holding (or, once sold, that bought) this unit.
    pub reservation_id: Option<ReservationId>,
    /// When the current reservation was taken.
    pub reserved_at: Option<DateTime<Utc>>,
    /// Deadline of the current reservation.
    pub expires_at: Option<DateTime<Utc>>,
    /// Holder the unit was sold to.
    pub sold_to: Option<HolderId>,
    /// When the unit was sold.
    pub sold_at: Option<DateTime<Utc>>,
    /// Holder display name frozen at sale time.
    pub attribution_snapshot: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl ResourceUnit {
    /// Build a fresh available unit.
    pub fn new(ordinal: i64, label: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: UnitId::new(),
            ordinal,
            label,
            status: UnitStatus::Available,
            reservation_id: None,
            reserved_at: None,
            expires_at: None,
            sold_to: None,
            sold_at: None,
            attribution_snapshot: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the unit can be reserved.
    pub fn is_available(&self) -> bool {
        self.status == UnitStatus::Available
    }

    /// Check whether the unit is held by the given reservation.
    pub fn is_reserved_by(&self, reservation_id: ReservationId) -> bool {
        self.status == UnitStatus::Reserved && self.reservation_id == Some(reservation_id)
    }

    /// Display name, falling back to the ordinal.
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("#{}", self.ordinal))
    }
}

/// Input for inserting a new unit into the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUnit {
    /// Allocation priority.
    pub ordinal: i64,
    /// Optional display label.
    pub label: Option<String>,
}
