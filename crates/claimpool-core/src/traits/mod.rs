//! Core traits defined in `claimpool-core` and implemented by other crates.

pub mod attribution;
pub mod clock;

pub use attribution::{AttributionSource, NoAttribution};
pub use clock::{Clock, ManualClock, SystemClock};
