//! Role-shaped dashboard aggregates.
//!
//! `GET /api/petitions/stats` returns a different object per viewer role.
//! The client decodes it against the viewer's role into one variant of
//! [`DashboardStats`], so an admin payload can never carry citizen fields.

use serde::{Deserialize, Serialize};

use super::petition::Status;
use super::user::Role;

/// Minimal petition reference used in dashboard lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetitionBrief {
    pub id: String,
    pub title: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCount {
    /// Department label as reported; may be a bucket such as "unassigned".
    pub department: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenStats {
    #[serde(default)]
    pub my_petitions: Vec<PetitionBrief>,
    #[serde(default)]
    pub status_data: Vec<StatusCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_petitions: u64,
    #[serde(default)]
    pub urgent_petitions: u64,
    #[serde(default)]
    pub pending_assignments: u64,
    #[serde(default)]
    pub department_data: Vec<DepartmentCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerStats {
    #[serde(default)]
    pub assigned_petitions: Vec<PetitionBrief>,
    #[serde(default)]
    pub department_stats: Vec<StatusCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardStats {
    Citizen(CitizenStats),
    Admin(AdminStats),
    Officer(OfficerStats),
}

impl DashboardStats {
    /// Decode a raw stats payload as the shape for `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not fit the role's shape.
    pub fn decode(role: Role, raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match role {
            Role::Citizen => Self::Citizen(serde_json::from_value(raw)?),
            Role::Admin => Self::Admin(serde_json::from_value(raw)?),
            Role::Officer => Self::Officer(serde_json::from_value(raw)?),
        })
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Citizen(_) => Role::Citizen,
            Self::Admin(_) => Role::Admin,
            Self::Officer(_) => Role::Officer,
        }
    }
}
