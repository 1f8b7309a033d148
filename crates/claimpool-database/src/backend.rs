//! Store selection: one handle bundling every store the engine needs.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use claimpool_core::config::{AppConfig, StoreBackend};
use claimpool_core::result::AppResult;
use claimpool_core::traits::AttributionSource;
use claimpool_entity::NewUnit;

use crate::connection::DatabasePool;
use crate::memory::{MemoryHolderProfiles, MemoryReservationStore, MemoryUnitStore};
use crate::migration::run_migrations;
use crate::repositories::{HolderProfileRepository, ReservationRepository, UnitRepository};
use crate::store::{HolderProfileStore, ReservationStore, UnitStore};

/// The set of stores backing one engine instance.
#[derive(Debug, Clone)]
pub struct StoreSet {
    /// Resource pool.
    pub units: Arc<dyn UnitStore>,
    /// Reservation records.
    pub reservations: Arc<dyn ReservationStore>,
    /// Holder profiles (writable side).
    pub profiles: Arc<dyn HolderProfileStore>,
    /// Holder profiles (attribution lookup side).
    pub attribution: Arc<dyn AttributionSource>,
    /// Database pool when backed by PostgreSQL.
    pub database: Option<DatabasePool>,
}

impl StoreSet {
    /// Fresh in-memory stores.
    pub fn memory() -> Self {
        let profiles = MemoryHolderProfiles::new();
        Self {
            units: Arc::new(MemoryUnitStore::new()),
            reservations: Arc::new(MemoryReservationStore::new()),
            profiles: Arc::new(profiles.clone()),
            attribution: Arc::new(profiles),
            database: None,
        }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(database: DatabasePool) -> Self {
        let pool = database.pool().clone();
        let profiles = HolderProfileRepository::new(pool.clone());
        Self {
            units: Arc::new(UnitRepository::new(pool.clone())),
            reservations: Arc::new(ReservationRepository::new(pool)),
            profiles: Arc::new(profiles.clone()),
            attribution: Arc::new(profiles),
            database: Some(database),
        }
    }

    /// Open the backend selected by configuration.
    ///
    /// For PostgreSQL this connects and, when enabled, runs migrations. For
    /// the memory backend it seeds `store.seed_units` units starting at
    /// ordinal 1.
    pub async fn open(config: &AppConfig) -> AppResult<Self> {
        match config.store.backend {
            StoreBackend::Postgres => {
                let database = DatabasePool::connect(&config.database).await?;
                if config.database.run_migrations {
                    run_migrations(database.pool()).await?;
                }
                Ok(Self::postgres(database))
            }
            StoreBackend::Memory => {
                let stores = Self::memory();
                let seed = config.store.seed_units;
                if seed > 0 {
                    let units: Vec<NewUnit> = (1..=i64::from(seed))
                        .map(|ordinal| NewUnit {
                            ordinal,
                            label: None,
                        })
                        .collect();
                    stores.units.insert_many(&units, Utc::now()).await?;
                }
                info!(seed_units = seed, "Using in-memory store");
                Ok(stores)
            }
        }
    }

    /// Backend health: the database round trip, or always healthy in memory.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.database {
            Some(database) => database.health_check().await,
            None => Ok(true),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}
