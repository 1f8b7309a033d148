//! Pool-level aggregates.

pub mod stats;

pub use stats::PoolStats;
