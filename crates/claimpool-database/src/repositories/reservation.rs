//! Reservation repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use claimpool_core::error::AppError;
use claimpool_core::result::AppResult;
use claimpool_core::types::{HolderId, ReservationId};
use claimpool_entity::{Reservation, ReservationStatus};

use super::db_error;
use crate::store::ReservationStore;

/// Repository for the `reservations` table.
///
/// The partial unique indexes created by the migrations back the
/// one-active-per-holder, one-active-per-unit and one-completed-per-holder
/// rules; violations surface as conflicts.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reservations \
             (id, unit_id, unit_ordinal, holder_id, reserved_at, expires_at, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'active')",
        )
        .bind(reservation.id)
        .bind(reservation.unit_id)
        .bind(reservation.unit_ordinal)
        .bind(&reservation.holder_id)
        .bind(reservation.reserved_at)
        .bind(reservation.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert reservation", e))?;
        Ok(())
    }

    async fn delete(&self, id: ReservationId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete reservation", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find reservation", e))
    }

    async fn find_active_by_holder(&self, holder: &HolderId) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE holder_id = $1 AND status = 'active'",
        )
        .bind(holder)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find active reservation", e))
    }

    async fn find_completed_by_holder(
        &self,
        holder: &HolderId,
    ) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE holder_id = $1 AND status = 'completed'",
        )
        .bind(holder)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find completed reservation", e))
    }

    async fn find_by_holder(&self, holder: &HolderId) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE holder_id = $1 ORDER BY reserved_at DESC, id DESC",
        )
        .bind(holder)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list holder reservations", e))
    }

    async fn find_by_status(
        &self,
        status: Option<ReservationStatus>,
    ) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE ($1::reservation_status IS NULL OR status = $1) \
             ORDER BY reserved_at DESC, id DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list reservations", e))
    }

    async fn find_sweep_candidates(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE status = 'active' AND expires_at < $1 \
             ORDER BY expires_at ASC, id ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find sweep candidates", e))
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
        let result = sqlx::query(
            "UPDATE reservations \
             SET status = $2, ended_at = $3, external_ref = COALESCE($4, external_ref), \
                 updated_at = $3 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(id)
        .bind(to)
        .bind(at)
        .bind(external_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to finish reservation", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn reopen(&self, id: ReservationId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE reservations \
             SET status = 'active', ended_at = NULL, external_ref = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'completed'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to reopen reservation", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn open_payment_window(&self, id: ReservationId, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE reservations \
             SET payment_window_opened_at = $2, payment_window_closed_at = NULL, updated_at = $2 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to open payment window", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn close_payment_window(
        &self,
        id: ReservationId,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE reservations \
             SET payment_window_closed_at = $2, updated_at = $2 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to close payment window", e))?;
        Ok(result.rows_affected() == 1)
    }
}
