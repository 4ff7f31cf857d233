use std::fmt;

use crate::model::petition::Status;
use crate::model::user::Role;

/// Machine-readable error codes for scripts and front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotSignedIn,
    RoleNotPermitted,
    ConfigParseError,
    SessionCorrupt,
    PetitionNotFound,
    InvalidField,
    InvalidEnumValue,
    DepartmentRequired,
    ActionNotPermitted,
    InvalidStateTransition,
    WouldRegressStatus,
    NothingLoaded,
    TransportFailed,
    ServerRejected,
    ResponseDecodeFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotSignedIn => "E1001",
            Self::RoleNotPermitted => "E1002",
            Self::ConfigParseError => "E1003",
            Self::SessionCorrupt => "E1004",
            Self::PetitionNotFound => "E2001",
            Self::InvalidField => "E2002",
            Self::InvalidEnumValue => "E2003",
            Self::DepartmentRequired => "E2004",
            Self::ActionNotPermitted => "E3001",
            Self::InvalidStateTransition => "E3002",
            Self::WouldRegressStatus => "E3003",
            Self::NothingLoaded => "E3004",
            Self::TransportFailed => "E5001",
            Self::ServerRejected => "E5002",
            Self::ResponseDecodeFailed => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotSignedIn => "Not signed in",
            Self::RoleNotPermitted => "Role not permitted for this view",
            Self::ConfigParseError => "Config file parse error",
            Self::SessionCorrupt => "Session file unreadable",
            Self::PetitionNotFound => "Petition not found",
            Self::InvalidField => "Invalid field value",
            Self::InvalidEnumValue => "Invalid status/department/role value",
            Self::DepartmentRequired => "Department selection required",
            Self::ActionNotPermitted => "Action not permitted",
            Self::InvalidStateTransition => "Invalid status transition",
            Self::WouldRegressStatus => "Assignment would regress status",
            Self::NothingLoaded => "No petition loaded",
            Self::TransportFailed => "Request could not reach the server",
            Self::ServerRejected => "Server rejected the request",
            Self::ResponseDecodeFailed => "Server response could not be decoded",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint surfaced next to the error.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotSignedIn => Some("Run `pt login` to start a session."),
            Self::RoleNotPermitted => Some("Run `pt dashboard` to see what your role can do."),
            Self::ConfigParseError => Some("Fix syntax in config.toml and retry."),
            Self::SessionCorrupt => Some("Run `pt logout` and sign in again."),
            Self::PetitionNotFound => Some("Use `pt list` to see available petitions."),
            Self::InvalidField => None,
            Self::InvalidEnumValue => Some("Use one of the documented status/department values."),
            Self::DepartmentRequired => Some(
                "Choose one of: health, education, transport, housing, environment.",
            ),
            Self::ActionNotPermitted => None,
            Self::InvalidStateTransition => Some(
                "Follow forward transitions: received -> assigned -> under_review -> resolved.",
            ),
            Self::WouldRegressStatus => {
                Some("Resolved petitions keep their department; reopen through the service first.")
            }
            Self::NothingLoaded => Some("Load the petition before acting on it."),
            Self::TransportFailed => Some("Check `api_url` in config.toml and that the service is up."),
            Self::ServerRejected => None,
            Self::ResponseDecodeFailed => Some("Client and server versions may disagree."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures from the petition service, as seen by the client.
///
/// Unauthenticated and unauthorized responses are ordinary `Rejected`
/// errors; no status gets special handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{}", rejected_text(*status, message.as_deref()))]
    Rejected {
        status: u16,
        /// `message` field from the response body, when present.
        message: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

fn rejected_text(status: u16, message: Option<&str>) -> String {
    message.map_or_else(
        || format!("request failed with status {status}"),
        |m| format!("{m} (status {status})"),
    )
}

impl ApiError {
    /// The message a view shows: the server's own message when it sent one,
    /// otherwise the view's fallback text.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::TransportFailed,
            Self::Rejected { status: 404, .. } => ErrorCode::PetitionNotFound,
            Self::Rejected { .. } => ErrorCode::ServerRejected,
            Self::Decode(_) => ErrorCode::ResponseDecodeFailed,
        }
    }
}

/// Client-side refusals raised before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("select a department before assigning")]
    DepartmentRequired,

    #[error("{action} is not available to {role}")]
    NotPermitted { action: &'static str, role: Role },

    #[error("cannot move petition from {from} to {to}")]
    TransitionNotAllowed { from: Status, to: Status },

    #[error("petition is {status}; assigning a department would reset it to assigned")]
    WouldRegress { status: Status },

    #[error("no petition is loaded")]
    NothingLoaded,
}

impl WorkflowError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyField { .. } | Self::InvalidField { .. } => ErrorCode::InvalidField,
            Self::DepartmentRequired => ErrorCode::DepartmentRequired,
            Self::NotPermitted { .. } => ErrorCode::ActionNotPermitted,
            Self::TransitionNotAllowed { .. } => ErrorCode::InvalidStateTransition,
            Self::WouldRegress { .. } => ErrorCode::WouldRegressStatus,
            Self::NothingLoaded => ErrorCode::NothingLoaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::NotSignedIn,
            ErrorCode::RoleNotPermitted,
            ErrorCode::ConfigParseError,
            ErrorCode::SessionCorrupt,
            ErrorCode::PetitionNotFound,
            ErrorCode::InvalidField,
            ErrorCode::InvalidEnumValue,
            ErrorCode::DepartmentRequired,
            ErrorCode::ActionNotPermitted,
            ErrorCode::InvalidStateTransition,
            ErrorCode::WouldRegressStatus,
            ErrorCode::NothingLoaded,
            ErrorCode::TransportFailed,
            ErrorCode::ServerRejected,
            ErrorCode::ResponseDecodeFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::WouldRegressStatus.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn server_message_wins_over_fallback() {
        let err = ApiError::Rejected {
            status: 400,
            message: Some("Title already used".into()),
        };
        assert_eq!(err.user_message("Failed to create petition"), "Title already used");
    }

    #[test]
    fn fallback_used_without_server_message() {
        let rejected = ApiError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(rejected.user_message("Failed"), "Failed");

        let blank = ApiError::Rejected {
            status: 500,
            message: Some("  ".into()),
        };
        assert_eq!(blank.user_message("Failed"), "Failed");

        let transport = ApiError::Transport("connection refused".into());
        assert_eq!(transport.user_message("Failed"), "Failed");
    }

    #[test]
    fn unauthorized_is_an_ordinary_rejection() {
        let err = ApiError::Rejected {
            status: 401,
            message: Some("Invalid token".into()),
        };
        assert_eq!(err.code(), ErrorCode::ServerRejected);
        assert_eq!(err.to_string(), "Invalid token (status 401)");
    }

    #[test]
    fn not_found_maps_to_petition_code() {
        let err = ApiError::Rejected {
            status: 404,
            message: None,
        };
        assert_eq!(err.code(), ErrorCode::PetitionNotFound);
        assert_eq!(err.to_string(), "request failed with status 404");
    }
}
