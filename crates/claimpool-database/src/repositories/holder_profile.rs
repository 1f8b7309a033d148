//! Holder profile repository: the live source of display attribution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use claimpool_core::result::AppResult;
use claimpool_core::traits::AttributionSource;
use claimpool_core::types::HolderId;

use super::db_error;
use crate::store::HolderProfileStore;

/// Repository for the `holder_profiles` table.
#[derive(Debug, Clone)]
pub struct HolderProfileRepository {
    pool: PgPool,
}

impl HolderProfileRepository {
    /// Create a new holder profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolderProfileStore for HolderProfileRepository {
    async fn set_display_name(
        &self,
        holder: &HolderId,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO holder_profiles (holder_id, display_name, updated_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (holder_id) DO UPDATE \
             SET display_name = EXCLUDED.display_name, updated_at = EXCLUDED.updated_at",
        )
        .bind(holder)
        .bind(display_name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to upsert holder profile", e))?;
        Ok(())
    }
}

#[async_trait]
impl AttributionSource for HolderProfileRepository {
    async fn snapshot(&self, holder: &HolderId) -> AppResult<Option<String>> {
        let name: Option<Option<String>> = sqlx::query_scalar(
            "SELECT display_name FROM holder_profiles WHERE holder_id = $1",
        )
        .bind(holder)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read holder profile", e))?;
        Ok(name.flatten())
    }
}
