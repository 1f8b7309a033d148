//! The reservation engine facade used by the API, CLI, and worker.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use claimpool_core::config::ReservationConfig;
use claimpool_core::traits::{AttributionSource, Clock};
use claimpool_core::types::{HolderId, ReservationId};
use claimpool_database::{HolderProfileStore, ReservationStore, StoreSet, UnitStore};
use claimpool_entity::{PoolStats, ReleaseReason, Reservation, ReservationStatus, ResourceUnit};

use crate::allocation::{Allocation, AllocationService};
use crate::completion::{Completion, CompletionService, ReservationTarget};
use crate::error::ReservationResult;
use crate::payment_window::PaymentWindowTracker;
use crate::pool::PoolAdminService;
use crate::query::{ActiveReservation, ReservationQueryService};
use crate::release::ReleaseService;
use crate::sweep::{ExpirySweeper, SweepReport};

/// Wires every engine component over one set of stores.
#[derive(Debug, Clone)]
pub struct ReservationEngine {
    allocation: AllocationService,
    payment_window: PaymentWindowTracker,
    completion: CompletionService,
    release: ReleaseService,
    sweeper: ExpirySweeper,
    query: ReservationQueryService,
    admin: PoolAdminService,
    clock: Arc<dyn Clock>,
}

impl ReservationEngine {
    /// Build an engine from individual stores.
    pub fn new(
        units: Arc<dyn UnitStore>,
        reservations: Arc<dyn ReservationStore>,
        profiles: Arc<dyn HolderProfileStore>,
        attribution: Arc<dyn AttributionSource>,
        clock: Arc<dyn Clock>,
        config: ReservationConfig,
    ) -> Self {
        let release = ReleaseService::new(units.clone(), reservations.clone(), clock.clone());
        let sweeper = ExpirySweeper::new(reservations.clone(), release.clone(), config.grace_period());
        Self {
            allocation: AllocationService::new(
                units.clone(),
                reservations.clone(),
                sweeper.clone(),
                clock.clone(),
                config,
            ),
            payment_window: PaymentWindowTracker::new(reservations.clone(), clock.clone()),
            completion: CompletionService::new(
                units.clone(),
                reservations.clone(),
                attribution,
                clock.clone(),
            ),
            query: ReservationQueryService::new(units.clone(), reservations, clock.clone()),
            admin: PoolAdminService::new(units, profiles, clock.clone()),
            release,
            sweeper,
            clock,
        }
    }

    /// Build an engine over a [`StoreSet`].
    pub fn from_stores(stores: &StoreSet, clock: Arc<dyn Clock>, config: ReservationConfig) -> Self {
        Self::new(
            stores.units.clone(),
            stores.reservations.clone(),
            stores.profiles.clone(),
            stores.attribution.clone(),
            clock,
            config,
        )
    }

    /// The engine's current time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// See [`AllocationService::allocate`].
    pub async fn allocate(&self, holder: &HolderId) -> ReservationResult<Allocation> {
        self.allocation.allocate(holder).await
    }

    /// See [`AllocationService::allocate_with_retry`].
    pub async fn allocate_with_retry(&self, holder: &HolderId) -> ReservationResult<Allocation> {
        self.allocation.allocate_with_retry(holder).await
    }

    /// See [`PaymentWindowTracker::mark_opened`].
    pub async fn mark_payment_window_opened(
        &self,
        id: ReservationId,
    ) -> ReservationResult<Reservation> {
        self.payment_window.mark_opened(id).await
    }

    /// See [`PaymentWindowTracker::mark_closed`].
    pub async fn mark_payment_window_closed(
        &self,
        id: ReservationId,
    ) -> ReservationResult<Reservation> {
        self.payment_window.mark_closed(id).await
    }

    /// See [`CompletionService::complete`].
    pub async fn complete(
        &self,
        target: ReservationTarget,
        external_ref: Option<&str>,
    ) -> ReservationResult<Completion> {
        self.completion.complete(target, external_ref).await
    }

    /// See [`ReleaseService::release`].
    pub async fn release(
        &self,
        id: ReservationId,
        reason: ReleaseReason,
    ) -> ReservationResult<Reservation> {
        self.release.release(id, reason).await
    }

    /// See [`ReleaseService::cancel_for_holder`].
    pub async fn cancel_for_holder(&self, holder: &HolderId) -> ReservationResult<Reservation> {
        self.release.cancel_for_holder(holder).await
    }

    /// See [`ExpirySweeper::sweep`].
    pub async fn sweep(&self, now: DateTime<Utc>) -> ReservationResult<u64> {
        self.sweeper.sweep(now).await
    }

    /// See [`ExpirySweeper::sweep_report`].
    pub async fn sweep_report(&self, now: DateTime<Utc>) -> ReservationResult<SweepReport> {
        self.sweeper.sweep_report(now).await
    }

    /// See [`ReservationQueryService::get_active`].
    pub async fn get_active(
        &self,
        holder: &HolderId,
    ) -> ReservationResult<Option<ActiveReservation>> {
        self.query.get_active(holder).await
    }

    /// See [`ReservationQueryService::holder_history`].
    pub async fn holder_history(&self, holder: &HolderId) -> ReservationResult<Vec<Reservation>> {
        self.query.holder_history(holder).await
    }

    /// See [`ReservationQueryService::has_claimed`].
    pub async fn has_claimed(&self, holder: &HolderId) -> ReservationResult<bool> {
        self.query.has_claimed(holder).await
    }

    /// See [`ReservationQueryService::list_reservations`].
    pub async fn list_reservations(
        &self,
        status: Option<ReservationStatus>,
    ) -> ReservationResult<Vec<Reservation>> {
        self.query.list_reservations(status).await
    }

    /// See [`ReservationQueryService::pool_stats`].
    pub async fn pool_stats(&self) -> ReservationResult<PoolStats> {
        self.query.pool_stats().await
    }

    /// See [`ReservationQueryService::list_units`].
    pub async fn list_units(&self) -> ReservationResult<Vec<ResourceUnit>> {
        self.query.list_units().await
    }

    /// See [`PoolAdminService::populate`].
    pub async fn populate(
        &self,
        first_ordinal: i64,
        count: u32,
        label_prefix: Option<&str>,
    ) -> ReservationResult<u64> {
        self.admin.populate(first_ordinal, count, label_prefix).await
    }

    /// See [`PoolAdminService::set_display_name`].
    pub async fn set_display_name(
        &self,
        holder: &HolderId,
        display_name: Option<&str>,
    ) -> ReservationResult<()> {
        self.admin.set_display_name(holder, display_name).await
    }
}
