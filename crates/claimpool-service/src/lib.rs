//! # claimpool-service
//!
//! The reservation engine. Each component owns one kind of state
//! transition and talks to storage only through the store traits in
//! `claimpool-database`.
//!
//! Services follow constructor injection: stores, the clock, and the
//! attribution source are provided as `Arc` references at construction.

pub mod allocation;
pub mod completion;
pub mod engine;
pub mod error;
pub mod payment_window;
pub mod pool;
pub mod query;
pub mod release;
pub mod sweep;

pub use allocation::{Allocation, AllocationService};
pub use completion::{Completion, CompletionService, ReservationTarget};
pub use engine::ReservationEngine;
pub use error::{ReservationError, ReservationResult};
pub use payment_window::PaymentWindowTracker;
pub use pool::PoolAdminService;
pub use query::{ActiveReservation, ReservationQueryService};
pub use release::ReleaseService;
pub use sweep::{ExpirySweeper, SweepReport};
