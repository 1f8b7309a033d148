//! Route handlers organized by domain.

pub mod admin;
pub mod health;
pub mod holder;
pub mod pool;
pub mod reservation;
