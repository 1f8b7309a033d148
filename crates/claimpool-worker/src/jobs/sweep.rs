//! Reservation expiry sweep job.

use async_trait::async_trait;
use serde_json::Value;

use claimpool_service::{ReservationEngine, ReservationError};

use crate::executor::{JobExecutionError, JobHandler};

/// Runs one expiry sweep at the engine's current time.
#[derive(Debug, Clone)]
pub struct SweepJobHandler {
    engine: ReservationEngine,
}

impl SweepJobHandler {
    /// Create a new sweep job handler
    pub fn new(engine: ReservationEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl JobHandler for SweepJobHandler {
    fn job_type(&self) -> &str {
        "reservation_sweep"
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let now = self.engine.now();
        let report = self.engine.sweep_report(now).await.map_err(|e| match e {
            ReservationError::Store(inner) => {
                JobExecutionError::Transient(format!("Sweep failed: {inner}"))
            }
            other => JobExecutionError::Internal(other.into()),
        })?;

        if report.failed > 0 {
            tracing::warn!(failed = report.failed, "Sweep left reservations unexpired");
        }

        Ok(serde_json::json!({
            "task": "reservation_sweep",
            "ran_at": now,
            "examined": report.examined,
            "expired": report.expired,
            "skipped_payment_window": report.skipped_payment_window,
            "raced": report.raced,
            "failed": report.failed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use claimpool_core::config::ReservationConfig;
    use claimpool_core::traits::ManualClock;
    use claimpool_core::types::HolderId;
    use claimpool_database::StoreSet;

    use super::*;

    #[tokio::test]
    async fn test_sweep_job_expires_overdue_reservations() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let stores = StoreSet::memory();
        let engine =
            ReservationEngine::from_stores(&stores, clock.clone(), ReservationConfig::default());
        engine.populate(1, 2, None).await.unwrap();
        engine
            .allocate(&HolderId::parse("stake1late").unwrap())
            .await
            .unwrap();

        let handler = SweepJobHandler::new(engine.clone());
        let summary = handler.execute().await.unwrap();
        assert_eq!(summary["expired"], 0);

        clock.advance(Duration::minutes(30));
        let summary = handler.execute().await.unwrap();
        assert_eq!(summary["examined"], 1);
        assert_eq!(summary["expired"], 1);
        assert_eq!(engine.pool_stats().await.unwrap().available, 2);
    }
}
