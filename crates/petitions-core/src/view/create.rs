//! New petition form.

use std::time::Duration;

use serde::Serialize;

use super::ActionError;
use crate::api::{NewPetition, PetitionApi};
use crate::guard::Route;
use crate::model::petition::Petition;
use crate::validate;

pub const CREATED: &str = "Petition created successfully!";
pub const CREATE_FAILED: &str = "Failed to create petition";

/// A navigation scheduled after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub petition: Petition,
    pub message: &'static str,
    pub redirect: Redirect,
}

/// Unsaved form input. Nothing is persisted until submit succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
}

impl CreateForm {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Submit the form.
    ///
    /// On success the caller shows [`CREATED`] and moves to the list view
    /// once `redirect_delay` has passed.
    ///
    /// # Errors
    ///
    /// Refused without a request if either field is blank or the title is
    /// invalid; otherwise fails with the service's message or
    /// [`CREATE_FAILED`].
    pub fn submit(
        &self,
        api: &dyn PetitionApi,
        redirect_delay: Duration,
    ) -> Result<Created, ActionError> {
        let body = NewPetition {
            title: validate::validate_title(&self.title)?.to_string(),
            description: validate::validate_description(&self.description)?.to_string(),
        };

        let petition = api
            .create_petition(&body)
            .map_err(|e| ActionError::from_api(e, CREATE_FAILED))?;
        tracing::info!(id = %petition.id, "petition created");

        Ok(Created {
            petition,
            message: CREATED,
            redirect: Redirect {
                to: Route::Petitions,
                after: redirect_delay,
            },
        })
    }
}
