//! Built-in job implementations.

pub mod sweep;

pub use sweep::SweepJobHandler;
