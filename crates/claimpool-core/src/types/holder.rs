//! Holder identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest identifier accepted; stake addresses are well below this.
pub const MAX_HOLDER_ID_LEN: usize = 256;

/// Identifier of the party a reservation is made for.
///
/// The value is an already-authenticated external identity (typically a
/// wallet or stake address) and is treated as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct HolderId(String);

impl HolderId {
    /// Build a holder id, rejecting blank or oversized values.
    pub fn parse(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("holder id must not be empty"));
        }
        if trimmed.len() > MAX_HOLDER_ID_LEN {
            return Err(AppError::validation(format!(
                "holder id must be at most {MAX_HOLDER_ID_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HolderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
