//! Scheduled background jobs for ClaimPool.
//!
//! This crate provides:
//! - A job handler trait and its error type
//! - The expiry sweep job
//! - A cron scheduler that runs registered jobs periodically

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobHandler};
pub use jobs::SweepJobHandler;
pub use scheduler::CronScheduler;
