//! In-memory store implementations for single-node deployments and tests.

pub mod profile;
pub mod reservation;
pub mod unit;

pub use profile::MemoryHolderProfiles;
pub use reservation::MemoryReservationStore;
pub use unit::MemoryUnitStore;
