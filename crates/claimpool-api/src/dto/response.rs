//! Response DTOs.

use serde::{Deserialize, Serialize};

use claimpool_entity::{PoolStats, Reservation};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Whether the backing store answered.
    pub store: String,
}

/// A holder's reservation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Holder the history belongs to.
    pub holder_id: String,
    /// Whether the holder has already bought a unit.
    pub has_claimed: bool,
    /// Every reservation, newest first.
    pub reservations: Vec<Reservation>,
}

/// Pool statistics with derived figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatsResponse {
    /// Raw counts.
    #[serde(flatten)]
    pub stats: PoolStats,
    /// No unit left to sell.
    pub sold_out: bool,
    /// Share of the pool sold, 0 to 100.
    pub sold_percent: f64,
}

impl From<PoolStats> for PoolStatsResponse {
    fn from(stats: PoolStats) -> Self {
        Self {
            sold_out: stats.is_sold_out(),
            sold_percent: stats.sold_percent(),
            stats,
        }
    }
}

/// Result of a pool seed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPoolResponse {
    /// Units actually inserted; existing ordinals are skipped.
    pub inserted: u64,
}
