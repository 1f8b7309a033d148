//! Core type definitions used across the ClaimPool workspace.

pub mod holder;
pub mod id;

pub use holder::HolderId;
pub use id::*;
