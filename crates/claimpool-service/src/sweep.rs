//! Expiry sweeper: returns timed-out units to the pool.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use claimpool_database::ReservationStore;
use claimpool_entity::ReleaseReason;

use crate::error::{ReservationError, ReservationResult};
use crate::release::ReleaseService;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Active reservations past deadline plus grace.
    pub examined: u64,
    /// Reservations expired by this pass.
    pub expired: u64,
    /// Candidates left alone because a payment window was open.
    pub skipped_payment_window: u64,
    /// Candidates that were completed or cancelled concurrently.
    pub raced: u64,
    /// Candidates whose release failed with a store error.
    pub failed: u64,
}

/// Expires active reservations whose deadline has passed.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    reservations: Arc<dyn ReservationStore>,
    release: ReleaseService,
    grace_period: Duration,
}

impl ExpirySweeper {
    /// Creates a new sweeper.
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        release: ReleaseService,
        grace_period: Duration,
    ) -> Self {
        Self {
            reservations,
            release,
            grace_period,
        }
    }

    /// Expire everything past deadline and return how many were expired.
    pub async fn sweep(&self, now: DateTime<Utc>) -> ReservationResult<u64> {
        Ok(self.sweep_report(now).await?.expired)
    }

    /// Expire everything past deadline and report what happened.
    ///
    /// A reservation is a candidate when `expires_at < now - grace`. Open
    /// payment windows are skipped. A failure on one candidate is logged and
    /// counted; the rest of the batch still runs.
    pub async fn sweep_report(&self, now: DateTime<Utc>) -> ReservationResult<SweepReport> {
        let mut report = SweepReport::default();
        let Some(cutoff) = now.checked_sub_signed(self.grace_period) else {
            return Ok(report);
        };

        let candidates = self.reservations.find_sweep_candidates(cutoff).await?;
        for candidate in candidates {
            report.examined += 1;
            // Candidates are active and past the cutoff already, so only an
            // open payment window can fail this.
            if !candidate.is_sweepable(now, self.grace_period) {
                debug!(
                    reservation_id = %candidate.id,
                    "Payment window open, not expiring"
                );
                report.skipped_payment_window += 1;
                continue;
            }

            match self
                .release
                .release(candidate.id, ReleaseReason::Expired)
                .await
            {
                Ok(_) => report.expired += 1,
                Err(ReservationError::NotActive { .. } | ReservationError::NotFound(_)) => {
                    report.raced += 1;
                }
                Err(e) => {
                    error!(
                        reservation_id = %candidate.id,
                        error = %e,
                        "Failed to expire reservation"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.examined > 0 {
            info!(
                examined = report.examined,
                expired = report.expired,
                skipped_payment_window = report.skipped_payment_window,
                raced = report.raced,
                failed = report.failed,
                "Expiry sweep finished"
            );
        }
        Ok(report)
    }
}
