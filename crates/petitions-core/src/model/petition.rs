use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// Lifecycle states of a petition.
///
/// `Unknown` absorbs any status string the service sends that this client
/// does not recognize, so one odd row does not fail a whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Received,
    Assigned,
    UnderReview,
    Resolved,
    Unknown,
}

impl Status {
    /// Targets offered by the status editor, in workflow order.
    pub const EDITABLE: [Self; 4] = [
        Self::Received,
        Self::Assigned,
        Self::UnderReview,
        Self::Resolved,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Assigned => "assigned",
            Self::UnderReview => "under_review",
            Self::Resolved => "resolved",
            Self::Unknown => "unknown",
        }
    }

    /// Position in the forward workflow; `None` for `Unknown`.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Received => Some(0),
            Self::Assigned => Some(1),
            Self::UnderReview => Some(2),
            Self::Resolved => Some(3),
            Self::Unknown => None,
        }
    }

    /// Whether a petition in this status is expected to carry a department.
    #[must_use]
    pub const fn requires_department(self) -> bool {
        matches!(self, Self::Assigned | Self::UnderReview | Self::Resolved)
    }

    /// True when `self` is strictly later than `other` in the forward workflow.
    /// `Unknown` is never after anything.
    #[must_use]
    pub fn is_after(self, other: Self) -> bool {
        match (self.rank(), other.rank()) {
            (Some(this), Some(other)) => this > other,
            _ => false,
        }
    }

    /// True when `target` is not earlier than `self` in the forward workflow.
    #[must_use]
    pub fn is_forward_to(self, target: Self) -> bool {
        match (self.rank(), target.rank()) {
            (Some(from), Some(to)) => to >= from,
            _ => false,
        }
    }
}

/// How the status editor constrains transitions.
///
/// The service is the authority on the workflow; by default the client
/// offers every editable status from every status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    #[default]
    Unrestricted,
    /// received -> assigned -> under_review -> resolved, never backwards.
    ForwardOnly,
}

impl TransitionPolicy {
    /// Validate a move from `from` to `to`.
    ///
    /// `Unknown` is never a valid target. Under `ForwardOnly` the move must
    /// not go backwards; staying put is allowed so remarks can be added.
    #[must_use]
    pub fn permits(self, from: Status, to: Status) -> bool {
        if to == Status::Unknown {
            return false;
        }
        match self {
            Self::Unrestricted => true,
            Self::ForwardOnly => from.is_forward_to(to),
        }
    }

    /// Targets the editor should offer for a petition currently in `from`.
    #[must_use]
    pub fn targets(self, from: Status) -> Vec<Status> {
        Status::EDITABLE
            .into_iter()
            .filter(|to| self.permits(from, *to))
            .collect()
    }
}

/// Fixed set of municipal departments a petition can be routed to.
///
/// `Unknown` stands in for department text the service sends that this
/// client does not recognize. It is never offered or sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Department {
    Health,
    Education,
    Transport,
    Housing,
    Environment,
    Unknown,
}

impl Department {
    pub const ALL: [Self; 5] = [
        Self::Health,
        Self::Education,
        Self::Transport,
        Self::Housing,
        Self::Environment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Education => "education",
            Self::Transport => "transport",
            Self::Housing => "housing",
            Self::Environment => "environment",
            Self::Unknown => "unknown",
        }
    }

    /// False for the `Unknown` catch-all.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Badge colour for a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Success,
    Warning,
    Info,
    Default,
}

impl BadgeColor {
    #[must_use]
    pub const fn for_status(status: Status) -> Self {
        match status {
            Status::Resolved => Self::Success,
            Status::UnderReview => Self::Warning,
            Status::Assigned => Self::Info,
            Status::Received | Status::Unknown => Self::Default,
        }
    }

    /// Total over arbitrary status text; unrecognized values get `Default`.
    #[must_use]
    pub fn for_status_str(raw: &str) -> Self {
        Self::for_status(raw.parse().unwrap_or(Status::Unknown))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Default => "default",
        }
    }
}

/// One entry of a petition's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub status: Status,
    #[serde(default)]
    pub remarks: String,
    pub created_at: DateTime<Utc>,
}

/// A petition as served by the API.
///
/// List responses omit `statusHistory`; it decodes as empty there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Petition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    #[serde(default)]
    pub urgency: bool,
    #[serde(default)]
    pub is_duplicate: bool,
    #[serde(default, deserialize_with = "department_or_blank")]
    pub assigned_department: Option<Department>,
    pub created_at: DateTime<Utc>,
    /// Newest first.
    #[serde(default)]
    pub status_history: Vec<StatusEvent>,
}

/// A broken data-model invariant found on a petition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    /// Status implies a department but none is set.
    MissingDepartment { status: Status },
    /// A department is set while the petition is still `received`.
    UnexpectedDepartment { department: Department },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDepartment { status } => {
                write!(f, "status {status} but no department assigned")
            }
            Self::UnexpectedDepartment { department } => {
                write!(f, "department {department} assigned while still received")
            }
        }
    }
}

impl Petition {
    /// Check `assignedDepartment` against `status`.
    #[must_use]
    pub fn consistency_issues(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        match (self.status, self.assigned_department) {
            (status, None) if status.requires_department() => {
                issues.push(ConsistencyIssue::MissingDepartment { status });
            }
            (Status::Received, Some(department)) => {
                issues.push(ConsistencyIssue::UnexpectedDepartment { department });
            }
            _ => {}
        }
        issues
    }

    #[must_use]
    pub const fn badge(&self) -> BadgeColor {
        BadgeColor::for_status(self.status)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for BadgeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "received" => Ok(Self::Received),
            "assigned" => Ok(Self::Assigned),
            "under_review" => Ok(Self::UnderReview),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Department {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "health" => Ok(Self::Health),
            "education" => Ok(Self::Education),
            "transport" => Ok(Self::Transport),
            "housing" => Ok(Self::Housing),
            "environment" => Ok(Self::Environment),
            _ => Err(ParseEnumError {
                expected: "department",
                got: s.to_string(),
            }),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Self::Unknown))
    }
}

impl Serialize for Department {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Department {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Self::Unknown))
    }
}

/// `null`, a missing field, and blank text all mean unassigned.
pub(crate) fn department_or_blank<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Department>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse().unwrap_or(Department::Unknown)))
}
