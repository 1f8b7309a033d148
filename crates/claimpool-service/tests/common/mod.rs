//! Shared harness for engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use claimpool_core::config::ReservationConfig;
use claimpool_core::error::AppError;
use claimpool_core::result::AppResult;
use claimpool_core::traits::{Clock, ManualClock};
use claimpool_core::types::{HolderId, ReservationId, UnitId};
use claimpool_database::memory::{MemoryHolderProfiles, MemoryReservationStore, MemoryUnitStore};
use claimpool_database::{ReservationStore, UnitSale, UnitStore};
use claimpool_entity::{NewUnit, PoolStats, Reservation, ReservationStatus, ResourceUnit, UnitStatus};
use claimpool_service::ReservationEngine;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn holder(name: &str) -> HolderId {
    HolderId::parse(name).unwrap()
}

pub struct Harness {
    pub engine: ReservationEngine,
    pub clock: Arc<ManualClock>,
    pub units: Arc<FlakyUnits>,
    pub reservations: Arc<FlakyReservations>,
    pub profiles: MemoryHolderProfiles,
}

impl Harness {
    pub async fn with_units(count: u32) -> Self {
        Self::with_config(count, ReservationConfig::default()).await
    }

    pub async fn with_config(count: u32, config: ReservationConfig) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let units = Arc::new(FlakyUnits::default());
        let reservations = Arc::new(FlakyReservations::default());
        let profiles = MemoryHolderProfiles::new();
        let engine = ReservationEngine::new(
            units.clone(),
            reservations.clone(),
            Arc::new(profiles.clone()),
            Arc::new(profiles.clone()),
            clock.clone(),
            config,
        );
        let harness = Self {
            engine,
            clock,
            units,
            reservations,
            profiles,
        };
        if count > 0 {
            harness.engine.populate(1, count, None).await.unwrap();
        }
        harness
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn unit(&self, ordinal: i64) -> ResourceUnit {
        self.units
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|u| u.ordinal == ordinal)
            .unwrap()
    }

    pub async fn reservation(&self, id: ReservationId) -> Reservation {
        self.reservations.find_by_id(id).await.unwrap().unwrap()
    }

    pub async fn stats(&self) -> PoolStats {
        self.units.stats().await.unwrap()
    }

    /// Every reserved unit must be linked to exactly one active reservation
    /// on that unit, and every active reservation to a unit it reserves.
    pub async fn assert_consistent(&self) {
        let units = self.units.list().await.unwrap();
        let active = self
            .reservations
            .find_by_status(Some(ReservationStatus::Active))
            .await
            .unwrap();
        for unit in units.iter().filter(|u| u.status == UnitStatus::Reserved) {
            let linked: Vec<_> = active
                .iter()
                .filter(|r| Some(r.id) == unit.reservation_id)
                .collect();
            assert_eq!(linked.len(), 1, "unit #{} has no active reservation", unit.ordinal);
            assert_eq!(linked[0].unit_id, unit.id);
        }
        for reservation in &active {
            let unit = units.iter().find(|u| u.id == reservation.unit_id).unwrap();
            assert!(
                unit.is_reserved_by(reservation.id),
                "active reservation {} does not hold unit #{}",
                reservation.id,
                unit.ordinal
            );
        }
    }
}

/// Unit store that can be told to fail or lose specific writes.
#[derive(Debug, Default)]
pub struct FlakyUnits {
    inner: MemoryUnitStore,
    pub fail_mark_reserved: AtomicBool,
    pub lose_mark_reserved: AtomicBool,
    pub fail_mark_sold: AtomicBool,
    pub fail_mark_available: AtomicBool,
    reserve_gate: Mutex<Option<Arc<Gate>>>,
}

impl FlakyUnits {
    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    /// Hold the next `mark_reserved` call before it touches the unit,
    /// until the returned gate is opened.
    pub fn pause_next_mark_reserved(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.reserve_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

/// Rendezvous between a paused store call and the test driving it.
#[derive(Debug, Default)]
pub struct Gate {
    reached: Notify,
    resume: Notify,
}

impl Gate {
    /// Wait until the paused call has arrived.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    /// Let the paused call continue.
    pub fn open(&self) {
        self.resume.notify_one();
    }

    async fn pass(&self) {
        self.reached.notify_one();
        self.resume.notified().await;
    }
}

fn tripped(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

#[async_trait]
impl UnitStore for FlakyUnits {
    async fn find_by_id(&self, id: UnitId) -> AppResult<Option<ResourceUnit>> {
        self.inner.find_by_id(id).await
    }

    async fn find_lowest_available(&self) -> AppResult<Option<ResourceUnit>> {
        self.inner.find_lowest_available().await
    }

    async fn find_sold_to(&self, holder: &HolderId) -> AppResult<Option<ResourceUnit>> {
        self.inner.find_sold_to(holder).await
    }

    async fn count_by_status(&self, status: UnitStatus) -> AppResult<u64> {
        self.inner.count_by_status(status).await
    }

    async fn stats(&self) -> AppResult<PoolStats> {
        self.inner.stats().await
    }

    async fn list(&self) -> AppResult<Vec<ResourceUnit>> {
        self.inner.list().await
    }

    async fn insert_many(&self, units: &[NewUnit], now: DateTime<Utc>) -> AppResult<u64> {
        self.inner.insert_many(units, now).await
    }

    async fn mark_reserved(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        reserved_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let gate = self.reserve_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if tripped(&self.fail_mark_reserved) {
            return Err(AppError::database("injected mark_reserved failure"));
        }
        if tripped(&self.lose_mark_reserved) {
            return Ok(false);
        }
        self.inner
            .mark_reserved(id, reservation_id, reserved_at, expires_at)
            .await
    }

    async fn mark_sold(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        sale: &UnitSale,
    ) -> AppResult<bool> {
        if tripped(&self.fail_mark_sold) {
            return Err(AppError::database("injected mark_sold failure"));
        }
        self.inner.mark_sold(id, reservation_id, sale).await
    }

    async fn mark_available(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        if tripped(&self.fail_mark_available) {
            return Err(AppError::database("injected mark_available failure"));
        }
        self.inner.mark_available(id, reservation_id, now).await
    }
}

/// Reservation store that can be told to fail compensating writes.
#[derive(Debug, Default)]
pub struct FlakyReservations {
    inner: MemoryReservationStore,
    pub fail_delete: AtomicBool,
    pub fail_reopen: AtomicBool,
}

#[async_trait]
impl ReservationStore for FlakyReservations {
    async fn insert(&self, reservation: &Reservation) -> AppResult<()> {
        self.inner.insert(reservation).await
    }

    async fn delete(&self, id: ReservationId) -> AppResult<bool> {
        if tripped(&self.fail_delete) {
            return Err(AppError::database("injected delete failure"));
        }
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        self.inner.find_by_id(id).await
    }

    async fn find_active_by_holder(&self, holder: &HolderId) -> AppResult<Option<Reservation>> {
        self.inner.find_active_by_holder(holder).await
    }

    async fn find_completed_by_holder(
        &self,
        holder: &HolderId,
    ) -> AppResult<Option<Reservation>> {
        self.inner.find_completed_by_holder(holder).await
    }

    async fn find_by_holder(&self, holder: &HolderId) -> AppResult<Vec<Reservation>> {
        self.inner.find_by_holder(holder).await
    }

    async fn find_by_status(
        &self,
        status: Option<ReservationStatus>,
    ) -> AppResult<Vec<Reservation>> {
        self.inner.find_by_status(status).await
    }

    async fn find_sweep_candidates(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        self.inner.find_sweep_candidates(cutoff).await
    }

    async fn finish(
        &self,
        id: ReservationId,
        to: ReservationStatus,
        at: DateTime<Utc>,
        external_ref: Option<&str>,
    ) -> AppResult<bool> {
        self.inner.finish(id, to, at, external_ref).await
    }

    async fn reopen(&self, id: ReservationId) -> AppResult<bool> {
        if tripped(&self.fail_reopen) {
            return Err(AppError::database("injected reopen failure"));
        }
        self.inner.reopen(id).await
    }

    async fn open_payment_window(&self, id: ReservationId, at: DateTime<Utc>) -> AppResult<bool> {
        self.inner.open_payment_window(id, at).await
    }

    async fn close_payment_window(
        &self,
        id: ReservationId,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.inner.close_payment_window(id, at).await
    }
}
