//! Per-invocation state shared by every command: home directory, effective
//! config, and the persisted session.

use petitions_core::config::{self, ClientConfig};
use petitions_core::error::ErrorCode;
use petitions_core::guard::{self, GuardDecision, Route};
use petitions_core::session::{Session, SessionState, SessionStore};

use crate::client::HttpApi;
use crate::output::{CliError, OutputMode, fail};

pub struct Context {
    pub config: ClientConfig,
    pub store: SessionStore,
    pub output: OutputMode,
}

impl Context {
    /// Resolve home, config, and session store.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.toml` exists but cannot be parsed.
    pub fn load(api_url: Option<&str>, output: OutputMode) -> anyhow::Result<Self> {
        let home = config::petitions_home();
        let config = match config::resolve_config(&home, api_url) {
            Ok(config) => config,
            Err(e) => {
                return fail(
                    output,
                    &CliError::from_code(ErrorCode::ConfigParseError, format!("{e:#}")),
                );
            }
        };
        tracing::debug!(home = %home.display(), api_url = %config.api_url, "context loaded");
        let store = SessionStore::new(&home);
        Ok(Self {
            config,
            store,
            output,
        })
    }

    /// Client without credentials, for signing in.
    pub fn anonymous_api(&self) -> HttpApi {
        HttpApi::new(&self.config.api_url, self.config.timeout(), None)
    }

    pub fn api(&self, session: &Session) -> HttpApi {
        HttpApi::new(
            &self.config.api_url,
            self.config.timeout(),
            Some(session.token.clone()),
        )
    }

    fn session_state(&self) -> anyhow::Result<SessionState> {
        match self.store.state() {
            Ok(state) => Ok(state),
            Err(e) => fail(self.output, &CliError::from_code(e.code(), e.to_string())),
        }
    }

    /// Run the route guard for `route` and hand back the session it admits.
    ///
    /// # Errors
    ///
    /// Fails with `E1001` when signed out and `E1002` when the role is not
    /// allowed on `route`.
    pub fn enter(&self, route: &Route) -> anyhow::Result<Session> {
        let state = self.session_state()?;
        match (guard::check_route(&state, route), state) {
            (GuardDecision::Render, SessionState::SignedIn(session)) => Ok(session),
            (GuardDecision::RedirectToDefault, SessionState::SignedIn(session)) => fail(
                self.output,
                &CliError::from_code(
                    ErrorCode::RoleNotPermitted,
                    format!("{route} is not available to {}", session.user.role),
                ),
            ),
            (GuardDecision::RedirectToLogin | GuardDecision::Render, _) => fail(
                self.output,
                &CliError::from_code(ErrorCode::NotSignedIn, format!("{route} requires a session")),
            ),
            (decision, _) => fail(
                self.output,
                &CliError::from_code(
                    ErrorCode::InternalUnexpected,
                    format!("unexpected guard decision {decision:?} for {route}"),
                ),
            ),
        }
    }
}
