//! Reservation status and release reasons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a reservation.
///
/// A reservation is created `Active` and moves exactly once to one of the
/// three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Holding its unit until the deadline.
    Active,
    /// Paid for; the unit is sold.
    Completed,
    /// Timed out and swept.
    Expired,
    /// Given up by the holder.
    Cancelled,
}

impl ReservationStatus {
    /// Check if the reservation is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "expired" => Ok(Self::Expired),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("unknown reservation status '{other}'")),
        }
    }
}

/// Why a reservation is being released back to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseReason {
    /// The holder gave up the reservation.
    #[default]
    Cancelled,
    /// The deadline passed without payment.
    Expired,
}

impl ReleaseReason {
    /// The terminal reservation status this reason leads to.
    pub fn status(&self) -> ReservationStatus {
        match self {
            Self::Cancelled => ReservationStatus::Cancelled,
            Self::Expired => ReservationStatus::Expired,
        }
    }
}

impl fmt::Display for ReleaseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status())
    }
}

impl FromStr for ReleaseReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown release reason '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_is_not_terminal() {
        assert!(!ReservationStatus::Active.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
        assert!(ReservationStatus::Expired.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_release_reason_maps_to_status() {
        assert_eq!(ReleaseReason::Expired.status(), ReservationStatus::Expired);
        assert_eq!(
            "canceled".parse::<ReleaseReason>().expect("parse"),
            ReleaseReason::Cancelled
        );
        assert!("completed".parse::<ReleaseReason>().is_err());
    }
}
