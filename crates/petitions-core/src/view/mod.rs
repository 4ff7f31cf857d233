//! Per-view state: what each screen holds between requests.
//!
//! Every view owns its own copy of fetched data and a single error message.
//! There is no cache shared between views.

pub mod create;
pub mod dashboard;
pub mod detail;
pub mod list;

use crate::error::{ApiError, ErrorCode, WorkflowError};

/// Fetch state of a view's primary content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Load<T> {
    Loading,
    Ready(T),
    /// The error message replaces the content entirely.
    Failed(String),
}

impl<T> Load<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Ready(_) => None,
        }
    }

    /// Build from a request result, replacing errors with the view's message.
    pub fn from_result(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => {
                tracing::warn!(error = %e, "request failed");
                Self::Failed(e.user_message(fallback))
            }
        }
    }
}

/// Outcome of an action the service accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Applied {
    /// The view now shows the service's copy.
    Refreshed,
    /// The change is saved but the re-fetch failed. The previous copy is
    /// still shown and `warning` is set as the view's action error.
    Stale { warning: String },
}

impl Applied {
    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Refreshed => None,
            Self::Stale { warning } => Some(warning.as_str()),
        }
    }
}

/// Why a user action did not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Refused client-side; no request was issued.
    #[error(transparent)]
    Refused(#[from] WorkflowError),

    /// The service call failed; `message` is what the view shows.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ActionError {
    pub(crate) fn from_api(source: ApiError, fallback: &str) -> Self {
        Self::Failed {
            message: source.user_message(fallback),
            source,
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Refused(e) => e.code(),
            Self::Failed { source, .. } => source.code(),
        }
    }

    /// True when the action was stopped before any request went out.
    #[must_use]
    pub const fn is_refused(&self) -> bool {
        matches!(self, Self::Refused(_))
    }
}
