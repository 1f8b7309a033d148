//! Resource unit repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use claimpool_core::result::AppResult;
use claimpool_core::types::{HolderId, ReservationId, UnitId};
use claimpool_entity::{NewUnit, PoolStats, ResourceUnit, UnitStatus};

use super::db_error;
use crate::store::{UnitSale, UnitStore};

/// Repository for the `resource_units` table.
#[derive(Debug, Clone)]
pub struct UnitRepository {
    pool: PgPool,
}

impl UnitRepository {
    /// Create a new unit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitStore for UnitRepository {
    async fn find_by_id(&self, id: UnitId) -> AppResult<Option<ResourceUnit>> {
        sqlx::query_as::<_, ResourceUnit>("SELECT * FROM resource_units WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find unit", e))
    }

    async fn find_lowest_available(&self) -> AppResult<Option<ResourceUnit>> {
        sqlx::query_as::<_, ResourceUnit>(
            "SELECT * FROM resource_units WHERE status = 'available' ORDER BY ordinal ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find available unit", e))
    }

    async fn find_sold_to(&self, holder: &HolderId) -> AppResult<Option<ResourceUnit>> {
        sqlx::query_as::<_, ResourceUnit>("SELECT * FROM resource_units WHERE sold_to = $1")
            .bind(holder)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find sold unit", e))
    }

    async fn count_by_status(&self, status: UnitStatus) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM resource_units WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count units", e))?;
        Ok(count.max(0) as u64)
    }

    async fn stats(&self) -> AppResult<PoolStats> {
        let rows: Vec<(UnitStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM resource_units GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute pool stats", e))?;

        let mut stats = PoolStats::default();
        for (status, count) in rows {
            let count = count.max(0) as u64;
            stats.total += count;
            match status {
                UnitStatus::Available => stats.available = count,
                UnitStatus::Reserved => stats.reserved = count,
                UnitStatus::Sold => stats.sold = count,
            }
        }
        Ok(stats)
    }

    async fn list(&self) -> AppResult<Vec<ResourceUnit>> {
        sqlx::query_as::<_, ResourceUnit>("SELECT * FROM resource_units ORDER BY ordinal ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list units", e))
    }

    async fn insert_many(&self, units: &[NewUnit], now: DateTime<Utc>) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin unit insert", e))?;

        let mut inserted = 0;
        for unit in units {
            let result = sqlx::query(
                "INSERT INTO resource_units (id, ordinal, label, status, created_at, updated_at) \
                 VALUES ($1, $2, $3, 'available', $4, $4) \
                 ON CONFLICT (ordinal) DO NOTHING",
            )
            .bind(UnitId::new())
            .bind(unit.ordinal)
            .bind(&unit.label)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert unit", e))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit unit insert", e))?;
        Ok(inserted)
    }

    async fn mark_reserved(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        reserved_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE resource_units \
             SET status = 'reserved', reservation_id = $2, reserved_at = $3, expires_at = $4, \
                 updated_at = $3 \
             WHERE id = $1 AND status = 'available'",
        )
        .bind(id)
        .bind(reservation_id)
        .bind(reserved_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to reserve unit", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_sold(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        sale: &UnitSale,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE resource_units \
             SET status = 'sold', sold_to = $3, sold_at = $4, attribution_snapshot = $5, \
                 updated_at = $4 \
             WHERE id = $1 AND status = 'reserved' AND reservation_id = $2",
        )
        .bind(id)
        .bind(reservation_id)
        .bind(&sale.holder)
        .bind(sale.sold_at)
        .bind(&sale.attribution_snapshot)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark unit sold", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_available(
        &self,
        id: UnitId,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE resource_units \
             SET status = 'available', reservation_id = NULL, reserved_at = NULL, \
                 expires_at = NULL, updated_at = $3 \
             WHERE id = $1 AND status = 'reserved' AND reservation_id = $2",
        )
        .bind(id)
        .bind(reservation_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to release unit", e))?;
        Ok(result.rows_affected() == 1)
    }
}
