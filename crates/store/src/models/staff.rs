//! Staff administration records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Staff role. The mess committee roles carry administrative privileges;
/// anything else deserializes to [`StaffRole::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    /// President Mess Committee. The protected super-admin role.
    #[serde(rename = "PMC")]
    Pmc,
    /// G2 (Mess) administrative role.
    #[serde(rename = "G2 (Mess)")]
    G2Mess,
    /// Mess Secretary administrative role.
    #[serde(rename = "Mess Secretary")]
    MessSecretary,
    /// Any non-administrative role.
    #[serde(other)]
    Other,
}

impl StaffRole {
    /// Role names permitted to delete users.
    pub const ADMIN_ROLE_NAMES: [&'static str; 3] = ["PMC", "G2 (Mess)", "Mess Secretary"];

    /// Whether this role may administer user deletion.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Pmc | Self::G2Mess | Self::MessSecretary)
    }

    /// Whether this role is exempt from deletion.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Pmc)
    }
}

/// A staff administration record from the `staff_state` collection.
///
/// Documents in that collection are written by the user-facing staff
/// management flows; both fields below may be absent on malformed or
/// partially-written documents, so they deserialize as optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRecord {
    /// Email address linking the record to an identity.
    #[serde(default)]
    pub email: Option<String>,
    /// Staff role.
    #[serde(default)]
    pub role: Option<StaffRole>,
    /// Arbitrary profile fields carried on the document.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
