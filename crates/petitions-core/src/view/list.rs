//! Petition list with filters.
//!
//! Every fetch is stamped with a ticket. Only the response for the most
//! recently issued ticket is applied, so a slow answer for an old filter
//! can never overwrite the rows for the current one.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Load;
use crate::api::PetitionApi;
use crate::error::{ApiError, ErrorCode};
use crate::model::filter::PetitionFilter;
use crate::model::petition::{BadgeColor, Department, Petition, Status};

pub const FETCH_FAILED: &str = "Failed to fetch petitions";

/// One rendered row of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub badge: BadgeColor,
    pub urgent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    pub created_at: DateTime<Utc>,
}

impl From<&Petition> for ListRow {
    fn from(p: &Petition) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            status: p.status,
            badge: p.badge(),
            urgent: p.urgency,
            department: p.assigned_department,
            created_at: p.created_at,
        }
    }
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    filter: PetitionFilter,
}

impl FetchTicket {
    #[must_use]
    pub const fn filter(&self) -> &PetitionFilter {
        &self.filter
    }
}

#[derive(Debug)]
pub struct PetitionListView {
    filter: PetitionFilter,
    issued: u64,
    state: Load<Vec<ListRow>>,
    failure: Option<ErrorCode>,
}

impl Default for PetitionListView {
    fn default() -> Self {
        Self::new(PetitionFilter::default())
    }
}

impl PetitionListView {
    #[must_use]
    pub const fn new(filter: PetitionFilter) -> Self {
        Self {
            filter,
            issued: 0,
            state: Load::Loading,
            failure: None,
        }
    }

    #[must_use]
    pub const fn filter(&self) -> &PetitionFilter {
        &self.filter
    }

    #[must_use]
    pub const fn state(&self) -> &Load<Vec<ListRow>> {
        &self.state
    }

    #[must_use]
    pub const fn failure_code(&self) -> Option<ErrorCode> {
        self.failure
    }

    #[must_use]
    pub fn rows(&self) -> &[ListRow] {
        self.state.ready().map(Vec::as_slice).unwrap_or_default()
    }

    /// Issue a ticket for the current filter.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.state = Load::Loading;
        FetchTicket {
            generation: self.issued,
            filter: self.filter.clone(),
        }
    }

    /// Replace the filter. Returns a ticket only if it changed by value.
    pub fn set_filter(&mut self, filter: PetitionFilter) -> Option<FetchTicket> {
        if filter == self.filter {
            return None;
        }
        self.filter = filter;
        Some(self.begin_fetch())
    }

    /// Apply a response. Returns `false` if the ticket was superseded and the
    /// response was dropped.
    pub fn apply(&mut self, ticket: &FetchTicket, result: Result<Vec<Petition>, ApiError>) -> bool {
        if ticket.generation != self.issued {
            tracing::debug!(
                stale = ticket.generation,
                current = self.issued,
                "dropping superseded list response"
            );
            return false;
        }
        self.failure = result.as_ref().err().map(ApiError::code);
        self.state = Load::from_result(
            result.map(|petitions| petitions.iter().map(ListRow::from).collect()),
            FETCH_FAILED,
        );
        true
    }

    /// Fetch for the current filter and apply the result.
    pub fn refresh(&mut self, api: &dyn PetitionApi) {
        let ticket = self.begin_fetch();
        let result = api.list_petitions(ticket.filter());
        self.apply(&ticket, result);
    }

    /// Change the filter and refetch if it differs. Returns whether a fetch
    /// was issued.
    pub fn change_filter(&mut self, api: &dyn PetitionApi, filter: PetitionFilter) -> bool {
        match self.set_filter(filter) {
            Some(ticket) => {
                let result = api.list_petitions(ticket.filter());
                self.apply(&ticket, result);
                true
            }
            None => false,
        }
    }
}
