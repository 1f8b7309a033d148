//! Resource unit entities.

pub mod model;
pub mod status;

pub use model::{NewUnit, ResourceUnit};
pub use status::UnitStatus;
