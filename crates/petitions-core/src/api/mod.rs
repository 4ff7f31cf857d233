//! The petition service seam.
//!
//! Views talk to the service only through [`PetitionApi`]. The CLI plugs in
//! an HTTP client. `memory::MemoryApi` stands in for the service in tests
//! and is built only with the `test-support` feature.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::filter::PetitionFilter;
use crate::model::petition::{Department, Petition, Status};
use crate::model::user::User;

/// REST paths consumed by the client.
pub mod endpoints {
    pub const LOGIN: &str = "/api/auth/login";
    pub const PETITIONS: &str = "/api/petitions";
    pub const STATS: &str = "/api/petitions/stats";

    #[must_use]
    pub fn petition(id: &str) -> String {
        format!("{PETITIONS}/{id}")
    }

    #[must_use]
    pub fn status(id: &str) -> String {
        format!("{PETITIONS}/{id}/status")
    }

    #[must_use]
    pub fn assign(id: &str) -> String {
        format!("{PETITIONS}/{id}/assign")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Body of `POST /api/petitions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPetition {
    pub title: String,
    pub description: String,
}

/// Body of `PUT /api/petitions/:id/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: Status,
    pub remarks: String,
}

/// Body of `PUT /api/petitions/:id/assign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub department: Department,
}

/// Operations the petition service exposes.
///
/// Implementations attach the session's bearer credential themselves.
/// Each call is a single request: no retries.
pub trait PetitionApi {
    /// # Errors
    /// Returns [`ApiError`] on transport failure or rejected credentials.
    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    /// # Errors
    /// Returns [`ApiError`] if the service refuses or cannot be reached.
    fn create_petition(&self, petition: &NewPetition) -> Result<Petition, ApiError>;

    /// # Errors
    /// Returns [`ApiError`] if the service refuses or cannot be reached.
    fn list_petitions(&self, filter: &PetitionFilter) -> Result<Vec<Petition>, ApiError>;

    /// Raw role-shaped stats object; see [`crate::model::stats::DashboardStats::decode`].
    ///
    /// # Errors
    /// Returns [`ApiError`] if the service refuses or cannot be reached.
    fn petition_stats(&self) -> Result<serde_json::Value, ApiError>;

    /// # Errors
    /// Returns [`ApiError`] if the service refuses or cannot be reached.
    fn get_petition(&self, id: &str) -> Result<Petition, ApiError>;

    /// # Errors
    /// Returns [`ApiError`] if the service refuses or cannot be reached.
    fn update_status(&self, id: &str, update: &StatusUpdate) -> Result<(), ApiError>;

    /// # Errors
    /// Returns [`ApiError`] if the service refuses or cannot be reached.
    fn assign_department(&self, id: &str, assignment: &Assignment) -> Result<(), ApiError>;
}
