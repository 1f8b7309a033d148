//! # claimpool-database
//!
//! Storage layer for ClaimPool: the [`UnitStore`] and [`ReservationStore`]
//! traits, their PostgreSQL repositories, and an in-memory implementation
//! that honours the same atomicity contract.

pub mod backend;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use backend::StoreSet;
pub use connection::DatabasePool;
pub use store::{HolderProfileStore, ReservationStore, UnitSale, UnitStore};
