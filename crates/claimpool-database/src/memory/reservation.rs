//! In-memory reservation store.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use claimpool_core::error::AppError;
use claimpool_core::result::AppResult;
use claimpool_core::types::{HolderId, ReservationId};
use claimpool_entity::{Reservation, ReservationStatus};

use crate::store::ReservationStore;

/// Reservation store backed by a Tokio mutex.
///
/// Uniqueness rules that PostgreSQL enforces with partial unique indexes
/// are checked here under the same lock as the write.
#[derive(Debug, Clone, Default)]
pub struct MemoryReservationStore {
    state: Arc<Mutex<HashMap<ReservationId, Reservation>>>,
}

impl MemoryReservationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by_key(|r| Reverse((r.reserved_at, r.id)));
    reservations
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn insert(&self, reservation: &Reservation) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.contains_key(&reservation.id) {
            return Err(AppError::conflict(format!(
                "reservation {} already exists",
                reservation.id
            )));
        }
        for existing in state.values().filter(|r| r.is_active()) {
            if existing.holder_id == reservation.holder_id {
                return Err(AppError::conflict(format!(
                    "holder {} already has an active reservation",
                    reservation.holder_id
                )));
            }
            if existing.unit_id == reservation.unit_id {
                return Err(AppError::conflict(format!(
                    "unit #{} already has an active reservation",
                    reservation.unit_ordinal
                )));
            }
        }
        state.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn delete(&self, id: ReservationId) -> AppResult<bool> {
        Ok(self.state.lock().await.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.state.lock().await.get(&id).cloned())
    }

    async fn find_active_by_holder(&self, holder: &HolderId) -> AppResult<Option<Reservation>> {
        let state = self.state.lock().await;
        Ok(state
            .values()
            .find(|r| r.is_active() && &r.holder_id == holder)
            .cloned())
    }

    async fn find_completed_by_holder(
        &self,
        holder: &HolderId,
    ) -> AppResult<Option<Reservation>> {
        let state = self.state.lock().await;
        Ok(state
            .values()
            .find(|r| r.status == ReservationStatus::Completed && &r.holder_id == holder)
            .cloned())
    }

    async fn find_by_holder(&self, holder: &HolderId) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let matching = state
            .values()
            .filter(|r| &r.holder_id == holder)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn find_by_status(
        &self,
        status: Option<ReservationStatus>,
    ) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let matching = state
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn find_sweep_candidates(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let mut candidates: Vec<Reservation> = state
            .values()
            .filter(|r| r.is_active() && r.expires_at < cutoff)
            .cloned()
            .collect();
        candidates.sort_by_key(|r| (r.expires_at, r.id));
        Ok(candidates)
    }

    async fn finish(
        &self,
        id: ReservationId,
        to: ReservationStatus,
        at: DateTime<Utc>,
        external_ref: Option<&str>,
    ) -> AppResult<bool> {
        if !to.is_terminal() {
            return Err(AppError::validation(format!(
                "cannot finish a reservation as '{to}'"
            )));
        }
        let mut state = self.state.lock().await;
        let Some(current) = state.get(&id) else {
            return Ok(false);
        };
        if !current.is_active() {
            return Ok(false);
        }
        if to == ReservationStatus::Completed {
            let holder = current.holder_id.clone();
            let already_completed = state
                .values()
                .any(|r| r.status == ReservationStatus::Completed && r.holder_id == holder);
            if already_completed {
                return Err(AppError::conflict(format!(
                    "holder {holder} already has a completed reservation"
                )));
            }
        }
        let Some(reservation) = state.get_mut(&id) else {
            return Ok(false);
        };
        reservation.status = to;
        reservation.ended_at = Some(at);
        if let Some(external_ref) = external_ref {
            reservation.external_ref = Some(external_ref.to_string());
        }
        Ok(true)
    }

    async fn reopen(&self, id: ReservationId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(current) = state.get(&id) else {
            return Ok(false);
        };
        if current.status != ReservationStatus::Completed {
            return Ok(false);
        }
        let (holder, unit_id) = (current.holder_id.clone(), current.unit_id);
        let clashes = state
            .values()
            .any(|r| r.is_active() && (r.holder_id == holder || r.unit_id == unit_id));
        if clashes {
            return Err(AppError::conflict(format!(
                "cannot reopen reservation {id}: holder or unit already has an active reservation"
            )));
        }
        let Some(reservation) = state.get_mut(&id) else {
            return Ok(false);
        };
        reservation.status = ReservationStatus::Active;
        reservation.ended_at = None;
        reservation.external_ref = None;
        Ok(true)
    }

    async fn open_payment_window(&self, id: ReservationId, at: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.get_mut(&id) {
            Some(reservation) if reservation.is_active() => {
                reservation.payment_window_opened_at = Some(at);
                reservation.payment_window_closed_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn close_payment_window(
        &self,
        id: ReservationId,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.get_mut(&id) {
            Some(reservation) if reservation.is_active() => {
                reservation.payment_window_closed_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use claimpool_entity::ResourceUnit;

    use super::*;

    fn reservation(holder: &str, ordinal: i64, now: DateTime<Utc>) -> Reservation {
        let unit = ResourceUnit::new(ordinal, None, now);
        Reservation::new(
            &unit,
            HolderId::parse(holder).unwrap(),
            now,
            Duration::minutes(20),
        )
    }

    #[tokio::test]
    async fn test_one_active_reservation_per_holder() {
        let store = MemoryReservationStore::new();
        let now = Utc::now();
        store.insert(&reservation("h1", 1, now)).await.unwrap();

        let err = store.insert(&reservation("h1", 2, now)).await.unwrap_err();
        assert!(err.is_conflict());
        store.insert(&reservation("h2", 2, now)).await.unwrap();
    }

    #[tokio::test]
    async fn test_finish_only_from_active() {
        let store = MemoryReservationStore::new();
        let now = Utc::now();
        let r = reservation("h1", 1, now);
        store.insert(&r).await.unwrap();

        assert!(
            store
                .finish(r.id, ReservationStatus::Expired, now, None)
                .await
                .unwrap()
        );
        assert!(
            !store
                .finish(r.id, ReservationStatus::Completed, now, Some("tx"))
                .await
                .unwrap()
        );
        let stored = store.find_by_id(r.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Expired);
        assert_eq!(stored.expires_at, r.expires_at);
        assert!(stored.external_ref.is_none());
    }

    #[tokio::test]
    async fn test_payment_window_reopen_clears_close() {
        let store = MemoryReservationStore::new();
        let now = Utc::now();
        let r = reservation("h1", 1, now);
        store.insert(&r).await.unwrap();

        assert!(store.open_payment_window(r.id, now).await.unwrap());
        assert!(store.close_payment_window(r.id, now).await.unwrap());
        assert!(store.open_payment_window(r.id, now).await.unwrap());
        let stored = store.find_by_id(r.id).await.unwrap().unwrap();
        assert!(stored.is_payment_window_open());
        assert_eq!(stored.expires_at, r.expires_at);
    }

    #[tokio::test]
    async fn test_sweep_candidates_are_strictly_before_cutoff() {
        let store = MemoryReservationStore::new();
        let now = Utc::now();
        let r = reservation("h1", 1, now);
        store.insert(&r).await.unwrap();

        assert!(store.find_sweep_candidates(r.expires_at).await.unwrap().is_empty());
        let found = store
            .find_sweep_candidates(r.expires_at + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
