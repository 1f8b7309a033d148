//! Pool occupancy counts.

use serde::{Deserialize, Serialize};

/// Number of units in each status.
///
/// Always computed from the unit rows, never stored, so it cannot drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// All units in the pool.
    pub total: u64,
    /// Units that can be reserved now.
    pub available: u64,
    /// Units held by an active reservation.
    pub reserved: u64,
    /// Units sold.
    pub sold: u64,
}

impl PoolStats {
    /// Whether every unit has been sold.
    pub fn is_sold_out(&self) -> bool {
        self.total > 0 && self.sold == self.total
    }

    /// Sold units as a percentage of the pool.
    pub fn sold_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.sold as f64 * 100.0 / self.total as f64
    }
}
