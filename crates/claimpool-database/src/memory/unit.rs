//! In-memory unit store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use claimpool_core::error::AppError;
use claimpool_core::result::AppResult;
use claimpool_core::types::{HolderId, ReservationId, UnitId};
use claimpool_entity::{NewUnit, PoolStats, ResourceUnit, UnitStatus};

use crate::store::{UnitSale, UnitStore};

#[derive(Debug, Default)]
struct InnerState {
    /// Units keyed by ordinal, so iteration is allocation order.
    by_ordinal: BTreeMap<i64, ResourceUnit>,
    /// Unit id to ordinal.
    ordinals: HashMap<UnitId, i64>,
}

impl InnerState {
    fn get(&self, id: UnitId) -> Option<&ResourceUnit> {
        self.ordinals
            .get(&id)
            .and_then(|ordinal| self.by_ordinal.get(ordinal))
    }

    fn get_mut(&mut self, id: UnitId) -> Option<&mut ResourceUnit> {
        let ordinal = *self.ordinals.get(&id)?;
        self.by_ordinal.get_mut(&ordinal)
    }
}

/// Unit store backed by a Tokio mutex.
///
/// Each operation holds the lock for its whole check-and-set, which gives
/// the same per-record atomicity as a conditional `UPDATE`.
#[derive(Debug, Clone, Default)]
pub struct MemoryUnitStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryUnitStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitStore for MemoryUnitStore {
    async fn find_by_id(&self, id: UnitId) -> AppResult<Option<ResourceUnit>> {
        Ok(self.state.lock().await.get(id).cloned())
    }

    async fn find_lowest_available(&self) -> AppResult<Option<ResourceUnit>> {
        let state = self.state.lock().await;
        Ok(state
            .by_ordinal
            .values()
            .find(|unit| unit.status == UnitStatus::Available)
            .cloned())
    }

    async fn find_sold_to(&self, holder: &HolderId) -> AppResult<Option<ResourceUnit>> {
        let state = self.state.lock().await;
        Ok(state
            .by_ordinal
            .values()
            .find(|unit| unit.sold_to.as_ref() == Some(holder))
            .cloned())
    }

    async fn count_by_status(&self, status: UnitStatus) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .by_ordinal
            .values()
            .filter(|unit| unit.status == status)
            .count() as u64)
    }

    async fn stats(&self) -> AppResult<PoolStats> {
        let state = self.state.lock().await;
        let mut stats = PoolStats::default();
        for unit in state.by_ordinal.values() {
            stats.total += 1;
            match unit.status {
                UnitStatus::Available => stats.available += 1,
                UnitStatus::Reserved => stats.reserved += 1,
                UnitStatus::Sold => stats.sold += 1,
            }
        }
        Ok(stats)
    }

    async fn list(&self) -> AppResult<Vec<ResourceUnit>> {
        Ok(self.state.lock().await.by_ordinal.values().cloned().collect())
    }

    async fn insert_many(&self, units: &[NewUnit], now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut inserted = 0;
        for new_unit in units {
            if state.by_ordinal.contains_key(&new_unit.ordinal) {
                continue;
            }
            let unit = ResourceUnit::new(new_unit.ordinal, new_unit.label.clone(), now);
            state.ordinals.insert(unit.id, unit.ordinal);
            state.by_ordinal.insert(unit.ordinal, unit);
            inserted += 1;
        }
        debug!(inserted, "Inserted units into memory store");
        Ok(inserted)
    }

    async fn mark_reserved(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        reserved_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(unit) = state.get_mut(id) else {
            return Ok(false);
        };
        if unit.status != UnitStatus::Available {
            return Ok(false);
        }
        unit.status = UnitStatus::Reserved;
        unit.reservation_id = Some(reservation_id);
        unit.reserved_at = Some(reserved_at);
        unit.expires_at = Some(expires_at);
        unit.updated_at = reserved_at;
        Ok(true)
    }

    async fn mark_sold(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        sale: &UnitSale,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let already_sold = state
            .by_ordinal
            .values()
            .any(|unit| unit.sold_to.as_ref() == Some(&sale.holder));
        if already_sold {
            return Err(AppError::conflict(format!(
                "a unit is already sold to holder {}",
                sale.holder
            )));
        }
        let Some(unit) = state.get_mut(id) else {
            return Ok(false);
        };
        if !unit.is_reserved_by(reservation_id) {
            return Ok(false);
        }
        unit.status = UnitStatus::Sold;
        unit.sold_to = Some(sale.holder.clone());
        unit.sold_at = Some(sale.sold_at);
        unit.attribution_snapshot = sale.attribution_snapshot.clone();
        unit.updated_at = sale.sold_at;
        Ok(true)
    }

    async fn mark_available(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(unit) = state.get_mut(id) else {
            return Ok(false);
        };
        if !unit.is_reserved_by(reservation_id) {
            return Ok(false);
        }
        unit.status = UnitStatus::Available;
        unit.reservation_id = None;
        unit.reserved_at = None;
        unit.expires_at = None;
        unit.updated_at = now;
        Ok(true)
    }
}
