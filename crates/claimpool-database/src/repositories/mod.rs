//! PostgreSQL repositories backing the store traits.

pub mod holder_profile;
pub mod reservation;
pub mod unit;

pub use holder_profile::HolderProfileRepository;
pub use reservation::ReservationRepository;
pub use unit::UnitRepository;

use claimpool_core::error::{AppError, ErrorKind};

/// Map an sqlx error, turning unique-index violations into conflicts.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> AppError {
    let unique_violation = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique_violation {
        AppError::with_source(ErrorKind::Conflict, format!("{context}: duplicate"), e)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), e)
    }
}
