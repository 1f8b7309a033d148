//! # claimpool-entity
//!
//! Domain entity models for ClaimPool. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod pool;
pub mod reservation;
pub mod unit;

pub use pool::PoolStats;
pub use reservation::{ReleaseReason, Reservation, ReservationStatus};
pub use unit::{NewUnit, ResourceUnit, UnitStatus};
