//! Blocking HTTP implementation of [`PetitionApi`].

use std::time::Duration;

use petitions_core::api::{
    Assignment, Credentials, LoginResponse, NewPetition, PetitionApi, StatusUpdate, endpoints,
};
use petitions_core::error::ApiError;
use petitions_core::model::filter::PetitionFilter;
use petitions_core::model::petition::Petition;
use serde::Deserialize;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("petitions-cli/", env!("CARGO_PKG_VERSION"));

/// Error bodies carry a `message` field when the service has something to say.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = self.url(path);
        tracing::debug!(method, url = %url, "api request");
        let request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ApiError> {
        response
            .into_json::<T>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn map_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_json::<ErrorBody>()
                .ok()
                .and_then(|body| body.message);
            tracing::debug!(status, ?message, "api rejected request");
            ApiError::Rejected { status, message }
        }
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

impl PetitionApi for HttpApi {
    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let response = self
            .request("POST", endpoints::LOGIN)
            .send_json(credentials)
            .map_err(map_error)?;
        Self::decode(response)
    }

    fn create_petition(&self, petition: &NewPetition) -> Result<Petition, ApiError> {
        let response = self
            .request("POST", endpoints::PETITIONS)
            .send_json(petition)
            .map_err(map_error)?;
        Self::decode(response)
    }

    fn list_petitions(&self, filter: &PetitionFilter) -> Result<Vec<Petition>, ApiError> {
        let mut request = self.request("GET", endpoints::PETITIONS);
        for (key, value) in filter.query_pairs() {
            request = request.query(key, &value);
        }
        let response = request.call().map_err(map_error)?;
        Self::decode(response)
    }

    fn petition_stats(&self) -> Result<serde_json::Value, ApiError> {
        let response = self
            .request("GET", endpoints::STATS)
            .call()
            .map_err(map_error)?;
        Self::decode(response)
    }

    fn get_petition(&self, id: &str) -> Result<Petition, ApiError> {
        let response = self
            .request("GET", &endpoints::petition(id))
            .call()
            .map_err(map_error)?;
        Self::decode(response)
    }

    fn update_status(&self, id: &str, update: &StatusUpdate) -> Result<(), ApiError> {
        self.request("PUT", &endpoints::status(id))
            .send_json(update)
            .map_err(map_error)?;
        Ok(())
    }

    fn assign_department(&self, id: &str, assignment: &Assignment) -> Result<(), ApiError> {
        self.request("PUT", &endpoints::assign(id))
            .send_json(assignment)
            .map_err(map_error)?;
        Ok(())
    }
}
