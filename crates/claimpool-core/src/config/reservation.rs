//! Reservation timing configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Reservation engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfig {
    /// Lifetime of a reservation in seconds. The deadline is fixed at
    /// creation and never extended.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Buffer after the deadline before the sweeper expires a reservation.
    #[serde(default = "default_grace_period")]
    pub grace_period_seconds: u64,
    /// Run an expiry sweep before every allocation.
    #[serde(default = "default_true")]
    pub sweep_on_allocate: bool,
    /// How many times a lost allocation race is retried before giving up.
    #[serde(default = "default_race_retry_limit")]
    pub race_retry_limit: u32,
}

impl ReservationConfig {
    /// Reservation lifetime as a chrono duration.
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout_seconds)
    }

    /// Sweep grace period as a chrono duration.
    pub fn grace_period(&self) -> Duration {
        seconds(self.grace_period_seconds)
    }
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            grace_period_seconds: default_grace_period(),
            sweep_on_allocate: true,
            race_retry_limit: default_race_retry_limit(),
        }
    }
}

fn seconds(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn default_timeout() -> u64 {
    20 * 60
}

fn default_grace_period() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_race_retry_limit() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_durations() {
        let config = ReservationConfig::default();
        assert_eq!(config.timeout(), Duration::minutes(20));
        assert_eq!(config.grace_period(), Duration::seconds(5));
    }
}
