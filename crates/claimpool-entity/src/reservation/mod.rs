//! Reservation entities.

pub mod model;
pub mod status;

pub use model::Reservation;
pub use status::{ReleaseReason, ReservationStatus};
