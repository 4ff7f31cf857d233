use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ParseEnumError;
use super::petition::{Department, department_or_blank};

/// The three user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Admin,
    Officer,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::Citizen, Self::Admin, Self::Officer];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Admin => "admin",
            Self::Officer => "officer",
        }
    }
}

/// The signed-in user as returned at login. Never mutated by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub role: Role,
    /// Set for officers only.
    #[serde(
        default,
        deserialize_with = "department_or_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub department: Option<Department>,
}

impl User {
    /// Whether this user is the officer responsible for `department`.
    #[must_use]
    pub fn is_officer_for(&self, department: Option<Department>) -> bool {
        self.role == Role::Officer
            && department.is_some_and(Department::is_known)
            && self.department == department
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "citizen" => Ok(Self::Citizen),
            "admin" => Ok(Self::Admin),
            "officer" => Ok(Self::Officer),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer(department: Option<Department>) -> User {
        User {
            id: "u-9".into(),
            first_name: "Dana".into(),
            role: Role::Officer,
            department,
        }
    }

    #[test]
    fn officer_matches_own_department_only() {
        let user = officer(Some(Department::Health));
        assert!(user.is_officer_for(Some(Department::Health)));
        assert!(!user.is_officer_for(Some(Department::Housing)));
        assert!(!user.is_officer_for(None));
    }

    #[test]
    fn officer_without_department_matches_nothing() {
        let user = officer(None);
        assert!(!user.is_officer_for(None));
    }

    #[test]
    fn unrecognized_department_matches_nobody() {
        let user = officer(Some(Department::Unknown));
        assert!(!user.is_officer_for(Some(Department::Unknown)));
    }

    #[test]
    fn admin_is_never_an_officer() {
        let user = User {
            id: "u-1".into(),
            first_name: "Ari".into(),
            role: Role::Admin,
            department: Some(Department::Health),
        };
        assert!(!user.is_officer_for(Some(Department::Health)));
    }

    #[test]
    fn user_decodes_from_login_payload() {
        let json = r#"{"id":"3","firstName":"Sam","role":"officer","department":"education"}"#;
        let user: User = serde_json::from_str(json).expect("decode user");
        assert_eq!(user.role, Role::Officer);
        assert_eq!(user.department, Some(Department::Education));
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert!("mayor".parse::<Role>().is_err());
    }
}
