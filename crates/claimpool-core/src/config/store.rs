//! Storage backend selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which store implementation backs the unit and reservation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgreSQL via sqlx (multi-process safe).
    #[default]
    Postgres,
    /// In-process memory store (single node, state lost on restart).
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Number of units to seed into an empty memory store on startup.
    #[serde(default)]
    pub seed_units: u32,
}
