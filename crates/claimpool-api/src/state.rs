//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use claimpool_core::config::AppConfig;
use claimpool_database::StoreSet;
use claimpool_service::ReservationEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Backing stores, used for health checks
    pub stores: StoreSet,
    /// The reservation engine
    pub engine: ReservationEngine,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Build the state from already-opened stores.
    pub fn new(config: Arc<AppConfig>, stores: StoreSet, engine: ReservationEngine) -> Self {
        Self {
            config,
            stores,
            engine,
            started_at: Instant::now(),
        }
    }
}
