//! Role-specific dashboard.

use super::Load;
use crate::api::PetitionApi;
use crate::error::{ApiError, ErrorCode};
use crate::model::stats::DashboardStats;
use crate::model::user::User;

#[derive(Debug)]
pub struct DashboardView {
    greeting: String,
    state: Load<DashboardStats>,
    failure: Option<ErrorCode>,
}

impl DashboardView {
    /// Fetch stats and decode them as the viewer's role shape.
    ///
    /// Failures keep the error's own text, transport errors included.
    #[must_use]
    pub fn load(api: &dyn PetitionApi, user: &User) -> Self {
        let result = api.petition_stats().and_then(|raw| {
            DashboardStats::decode(user.role, raw).map_err(|e| ApiError::Decode(e.to_string()))
        });
        let (state, failure) = match result {
            Ok(stats) => (Load::Ready(stats), None),
            Err(e) => {
                tracing::warn!(error = %e, "stats fetch failed");
                (Load::Failed(e.to_string()), Some(e.code()))
            }
        };
        Self {
            greeting: format!("Welcome, {}!", user.first_name),
            state,
            failure,
        }
    }

    #[must_use]
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    #[must_use]
    pub const fn state(&self) -> &Load<DashboardStats> {
        &self.state
    }

    #[must_use]
    pub const fn failure_code(&self) -> Option<ErrorCode> {
        self.failure
    }
}
