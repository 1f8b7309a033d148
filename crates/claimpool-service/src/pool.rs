//! Pool and holder profile administration.

use std::sync::Arc;

use tracing::info;

use claimpool_core::error::AppError;
use claimpool_core::traits::Clock;
use claimpool_core::types::HolderId;
use claimpool_database::{HolderProfileStore, UnitStore};
use claimpool_entity::NewUnit;

use crate::error::ReservationResult;

/// Longest accepted display name or label prefix.
const MAX_NAME_LEN: usize = 128;

/// Seeds the pool and maintains holder display names.
#[derive(Debug, Clone)]
pub struct PoolAdminService {
    units: Arc<dyn UnitStore>,
    profiles: Arc<dyn HolderProfileStore>,
    clock: Arc<dyn Clock>,
}

impl PoolAdminService {
    /// Creates a new pool admin service.
    pub fn new(
        units: Arc<dyn UnitStore>,
        profiles: Arc<dyn HolderProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            units,
            profiles,
            clock,
        }
    }

    /// Insert `count` available units numbered from `first_ordinal`.
    ///
    /// Ordinals that already exist are skipped. With a `label_prefix` each
    /// unit is labelled `"{prefix} #{ordinal}"`. Returns the number inserted.
    pub async fn populate(
        &self,
        first_ordinal: i64,
        count: u32,
        label_prefix: Option<&str>,
    ) -> ReservationResult<u64> {
        if count == 0 {
            return Err(AppError::validation("count must be greater than zero").into());
        }
        let last_ordinal = first_ordinal
            .checked_add(i64::from(count) - 1)
            .ok_or_else(|| AppError::validation("ordinal range overflows"))?;
        let prefix = label_prefix.map(str::trim).filter(|p| !p.is_empty());
        if prefix.is_some_and(|p| p.len() > MAX_NAME_LEN) {
            return Err(AppError::validation(format!(
                "label prefix must be at most {MAX_NAME_LEN} bytes"
            ))
            .into());
        }

        let units: Vec<NewUnit> = (first_ordinal..=last_ordinal)
            .map(|ordinal| NewUnit {
                ordinal,
                label: prefix.map(|p| format!("{p} #{ordinal}")),
            })
            .collect();
        let inserted = self.units.insert_many(&units, self.clock.now()).await?;

        info!(
            first_ordinal,
            last_ordinal,
            requested = count,
            inserted,
            "Pool populated"
        );
        Ok(inserted)
    }

    /// Set or clear the display name that is frozen onto a unit at sale.
    pub async fn set_display_name(
        &self,
        holder: &HolderId,
        display_name: Option<&str>,
    ) -> ReservationResult<()> {
        let name = display_name.map(str::trim).filter(|n| !n.is_empty());
        if name.is_some_and(|n| n.len() > MAX_NAME_LEN) {
            return Err(AppError::validation(format!(
                "display name must be at most {MAX_NAME_LEN} bytes"
            ))
            .into());
        }
        self.profiles
            .set_display_name(holder, name, self.clock.now())
            .await?;
        info!(holder_id = %holder, cleared = name.is_none(), "Holder display name updated");
        Ok(())
    }
}
