//! Job handler contract.

use async_trait::async_trait;
use serde_json::Value;

use claimpool_core::error::AppError;

/// A unit of scheduled work.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Name used in logs and schedule registration.
    fn job_type(&self) -> &str;

    /// Run the job once and return a JSON summary.
    async fn execute(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, retrying will not help
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}
