//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use claimpool_entity::ReleaseReason;

/// Allocate request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AllocateRequest {
    /// Holder asking for a unit.
    #[validate(length(min = 1, max = 256, message = "holder_id is required"))]
    pub holder_id: String,
}

/// Completion request body, shared by the by-id and by-holder routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CompleteRequest {
    /// Payment reference from the external processor.
    #[validate(length(min = 1, max = 256))]
    pub external_ref: Option<String>,
}

/// Release request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReleaseRequest {
    /// Why the reservation is released (default: cancelled).
    #[serde(default)]
    pub reason: ReleaseReason,
}

/// Query parameters for listing reservations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListReservationsQuery {
    /// Status filter, e.g. `active`.
    pub status: Option<String>,
}

/// Holder profile update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetProfileRequest {
    /// Display name, or `null` to clear it.
    #[validate(length(max = 128))]
    pub display_name: Option<String>,
}

/// Pool seeding request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SeedPoolRequest {
    /// Ordinal of the first unit.
    #[serde(default = "default_first_ordinal")]
    pub first_ordinal: i64,
    /// Number of units to add.
    #[validate(range(min = 1, max = 100_000))]
    pub count: u32,
    /// Label prefix, producing labels like `Prefix #7`.
    #[validate(length(max = 128))]
    pub label_prefix: Option<String>,
}

fn default_first_ordinal() -> i64 {
    1
}
