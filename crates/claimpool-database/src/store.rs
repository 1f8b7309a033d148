//! Store traits for the resource pool and the reservation table.
//!
//! Every method that changes a record is a single atomic conditional update
//! against that record: it checks the record's current status and writes
//! the new state in one step, returning `false` when the precondition no
//! longer holds. Callers compose these into multi-record transitions and
//! compensate on partial failure.
//!
//! Implementations must also reject, with an `ErrorKind::Conflict` error:
//! - a second active reservation for the same holder or the same unit,
//! - a second completed reservation for the same holder,
//! - a second unit sold to the same holder.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use claimpool_core::result::AppResult;
use claimpool_core::traits::AttributionSource;
use claimpool_core::types::{HolderId, ReservationId, UnitId};
use claimpool_entity::{NewUnit, PoolStats, Reservation, ReservationStatus, ResourceUnit, UnitStatus};

/// Sale attribution written onto a unit when it is sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSale {
    /// Buyer.
    pub holder: HolderId,
    /// Sale time.
    pub sold_at: DateTime<Utc>,
    /// Buyer display name captured at sale time.
    pub attribution_snapshot: Option<String>,
}

/// Durable state of every resource unit.
#[async_trait]
pub trait UnitStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a unit by its identifier.
    async fn find_by_id(&self, id: UnitId) -> AppResult<Option<ResourceUnit>>;

    /// The available unit with the lowest ordinal.
    async fn find_lowest_available(&self) -> AppResult<Option<ResourceUnit>>;

    /// The unit sold to `holder`, if any.
    async fn find_sold_to(&self, holder: &HolderId) -> AppResult<Option<ResourceUnit>>;

    /// Number of units in `status`.
    async fn count_by_status(&self, status: UnitStatus) -> AppResult<u64>;

    /// Per-status counts for the whole pool.
    async fn stats(&self) -> AppResult<PoolStats>;

    /// All units ordered by ordinal.
    async fn list(&self) -> AppResult<Vec<ResourceUnit>>;

    /// Insert available units, skipping ordinals that already exist.
    /// Returns the number inserted.
    async fn insert_many(&self, units: &[NewUnit], now: DateTime<Utc>) -> AppResult<u64>;

    /// `Available → Reserved`, linking the reservation and mirroring its
    /// timestamps.
    async fn mark_reserved(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        reserved_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// `Reserved(by reservation_id) → Sold`, recording the sale.
    async fn mark_sold(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        sale: &UnitSale,
    ) -> AppResult<bool>;

    /// `Reserved(by reservation_id) → Available`, clearing the linkage.
    async fn mark_available(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Durable state of every reservation record.
#[async_trait]
pub trait ReservationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new active reservation.
    async fn insert(&self, reservation: &Reservation) -> AppResult<()>;

    /// Remove a reservation outright. Only used to undo a failed allocation.
    async fn delete(&self, id: ReservationId) -> AppResult<bool>;

    /// Find a reservation by its identifier.
    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// The holder's active reservation, if any.
    async fn find_active_by_holder(&self, holder: &HolderId) -> AppResult<Option<Reservation>>;

    /// The holder's completed reservation, if any.
    async fn find_completed_by_holder(&self, holder: &HolderId)
    -> AppResult<Option<Reservation>>;

    /// Every reservation the holder ever made, newest first.
    async fn find_by_holder(&self, holder: &HolderId) -> AppResult<Vec<Reservation>>;

    /// Reservations in `status` (all when `None`), newest first.
    async fn find_by_status(&self, status: Option<ReservationStatus>)
    -> AppResult<Vec<Reservation>>;

    /// Active reservations whose deadline is strictly before `cutoff`,
    /// oldest deadline first.
    async fn find_sweep_candidates(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Reservation>>;

    /// `Active → to` for a terminal `to`, stamping `ended_at` and, when
    /// given, the external payment reference.
    async fn finish(
        &self,
        id: ReservationId,
        to: ReservationStatus,
        at: DateTime<Utc>,
        external_ref: Option<&str>,
    ) -> AppResult<bool>;

    /// `Completed → Active`. Only used to undo a completion whose unit
    /// write failed.
    async fn reopen(&self, id: ReservationId) -> AppResult<bool>;

    /// Stamp the payment window as opened (and not closed) on an active
    /// reservation.
    async fn open_payment_window(&self, id: ReservationId, at: DateTime<Utc>) -> AppResult<bool>;

    /// Stamp the payment window as closed on an active reservation.
    async fn close_payment_window(&self, id: ReservationId, at: DateTime<Utc>)
    -> AppResult<bool>;
}

/// Writable holder profiles, the live source of display attribution.
#[async_trait]
pub trait HolderProfileStore: AttributionSource {
    /// Set the holder's display name, or clear it with `None`.
    async fn set_display_name(
        &self,
        holder: &HolderId,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()>;
}
