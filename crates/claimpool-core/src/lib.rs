//! # claimpool-core
//!
//! Core crate for ClaimPool. Contains configuration schemas, typed
//! identifiers, the clock and attribution traits, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other ClaimPool crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
