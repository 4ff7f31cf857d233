//! Route table and the navigation guard.

use std::fmt;

use crate::model::user::Role;
use crate::session::SessionState;

/// Navigable views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Dashboard,
    Petitions,
    CreatePetition,
    PetitionDetail(String),
    Profile,
}

impl Route {
    /// Where a signed-in user lands when a route refuses their role.
    pub const DEFAULT: Self = Self::Dashboard;

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Home => "/".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Petitions => "/petitions".to_string(),
            Self::CreatePetition => "/petitions/create".to_string(),
            Self::PetitionDetail(id) => format!("/petitions/{id}"),
            Self::Profile => "/profile".to_string(),
        }
    }

    /// Map a path back to a route. `/petitions/create` wins over the detail
    /// pattern.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match trimmed {
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/" => Some(Self::Home),
            "/dashboard" => Some(Self::Dashboard),
            "/petitions" => Some(Self::Petitions),
            "/petitions/create" => Some(Self::CreatePetition),
            "/profile" => Some(Self::Profile),
            other => other
                .strip_prefix("/petitions/")
                .filter(|id| !id.is_empty() && !id.contains('/'))
                .map(|id| Self::PetitionDetail(id.to_string())),
        }
    }

    /// Whether the route is reachable without a session.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Roles allowed on this route; `None` means any signed-in user.
    #[must_use]
    pub const fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Self::CreatePetition => Some(&[Role::Citizen]),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.path())
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving; show a neutral loading state.
    Loading,
    Render,
    RedirectToLogin,
    /// Signed in, but the role is not allowed here.
    RedirectToDefault,
}

impl GuardDecision {
    /// Redirect target, if the decision is a redirect.
    #[must_use]
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::RedirectToLogin => Some(Route::Login),
            Self::RedirectToDefault => Some(Route::DEFAULT),
            Self::Loading | Self::Render => None,
        }
    }
}

/// Decide whether to render, given the session and an optional role set.
#[must_use]
pub fn check(state: &SessionState, required_roles: Option<&[Role]>) -> GuardDecision {
    match state {
        SessionState::Resolving => GuardDecision::Loading,
        SessionState::SignedOut => GuardDecision::RedirectToLogin,
        SessionState::SignedIn(session) => match required_roles {
            Some(roles) if !roles.contains(&session.user.role) => {
                GuardDecision::RedirectToDefault
            }
            _ => GuardDecision::Render,
        },
    }
}

/// Guard a route from the table. Public routes always render.
#[must_use]
pub fn check_route(state: &SessionState, route: &Route) -> GuardDecision {
    if route.is_public() {
        return GuardDecision::Render;
    }
    let decision = check(state, route.required_roles());
    if decision != GuardDecision::Render {
        tracing::debug!(route = %route, ?decision, "route guarded");
    }
    decision
}
