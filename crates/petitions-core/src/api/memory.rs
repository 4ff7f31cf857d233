//! In-process petition service.
//!
//! Behaves like the REST service as far as the client can observe: assigning
//! a department resets status to `assigned`, status updates prepend a history
//! event, and role checks answer 401/403. Every call is recorded so tests can
//! assert exactly which requests a view issued.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::Utc;

use super::{
    Assignment, Credentials, LoginResponse, NewPetition, PetitionApi, StatusUpdate, endpoints,
};
use crate::error::ApiError;
use crate::model::filter::PetitionFilter;
use crate::model::petition::{Petition, Status, StatusEvent};
use crate::model::stats::{
    AdminStats, CitizenStats, DepartmentCount, OfficerStats, PetitionBrief, StatusCount,
};
use crate::model::user::{Role, User};

/// One request as the service saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

#[derive(Debug, Default)]
struct MemoryState {
    petitions: Vec<Petition>,
    owners: HashMap<String, String>,
    accounts: Vec<(Credentials, User)>,
    viewer: Option<User>,
    next_id: u64,
    calls: Vec<RecordedCall>,
    failures: VecDeque<ApiError>,
    targeted: Vec<(&'static str, String, ApiError)>,
}

#[derive(Debug, Default)]
pub struct MemoryApi {
    state: RefCell<MemoryState>,
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: Some(message.to_string()),
    }
}

fn briefs<'a>(petitions: impl Iterator<Item = &'a Petition>) -> Vec<PetitionBrief> {
    petitions
        .map(|p| PetitionBrief {
            id: p.id.clone(),
            title: p.title.clone(),
            status: p.status,
        })
        .collect()
}

fn status_counts<'a>(petitions: impl Iterator<Item = &'a Petition>) -> Vec<StatusCount> {
    let mut counts: BTreeMap<&'static str, (Status, u64)> = BTreeMap::new();
    for p in petitions {
        counts.entry(p.status.as_str()).or_insert((p.status, 0)).1 += 1;
    }
    counts
        .into_values()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

impl MemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Act as `user` for subsequent calls, as if already signed in.
    #[must_use]
    pub fn with_viewer(self, user: User) -> Self {
        self.state.borrow_mut().viewer = Some(user);
        self
    }

    /// Register an account that `login` accepts.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, user: User) -> Self {
        self.state.borrow_mut().accounts.push((
            Credentials {
                email: email.to_string(),
                password: password.to_string(),
            },
            user,
        ));
        self
    }

    /// Store a petition as-is and return its id.
    pub fn insert(&self, petition: Petition) -> String {
        let id = petition.id.clone();
        self.state.borrow_mut().petitions.push(petition);
        id
    }

    /// Make the next call fail with `error` before it touches any state.
    pub fn fail_next(&self, error: ApiError) {
        self.state.borrow_mut().failures.push_back(error);
    }

    /// Make the next `method` request to `path` fail. Other calls are
    /// served normally until then.
    pub fn fail_request(&self, method: &'static str, path: impl Into<String>, error: ApiError) {
        self.state
            .borrow_mut()
            .targeted
            .push((method, path.into(), error));
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    #[must_use]
    pub fn petition(&self, id: &str) -> Option<Petition> {
        self.state
            .borrow()
            .petitions
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn begin(
        &self,
        method: &'static str,
        path: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        tracing::debug!(method, path = %path, "memory api call");
        let hit = state
            .targeted
            .iter()
            .position(|(m, p, _)| *m == method && *p == path);
        state.calls.push(RecordedCall {
            method,
            path,
            query,
        });
        if let Some(index) = hit {
            return Err(state.targeted.remove(index).2);
        }
        state.failures.pop_front().map_or(Ok(()), Err)
    }

    fn viewer(&self) -> Result<User, ApiError> {
        self.state
            .borrow()
            .viewer
            .clone()
            .ok_or_else(|| rejected(401, "Authentication required"))
    }
}

impl PetitionApi for MemoryApi {
    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.begin("POST", endpoints::LOGIN.to_string(), Vec::new())?;
        let mut state = self.state.borrow_mut();
        let user = state
            .accounts
            .iter()
            .find(|(c, _)| c == credentials)
            .map(|(_, u)| u.clone())
            .ok_or_else(|| rejected(401, "Invalid email or password"))?;
        state.viewer = Some(user.clone());
        Ok(LoginResponse {
            token: format!("mem-token-{}", user.id),
            user,
        })
    }

    fn create_petition(&self, petition: &NewPetition) -> Result<Petition, ApiError> {
        self.begin("POST", endpoints::PETITIONS.to_string(), Vec::new())?;
        let viewer = self.viewer()?;
        if viewer.role != Role::Citizen {
            return Err(rejected(403, "Only citizens can file petitions"));
        }
        if petition.title.trim().is_empty() || petition.description.trim().is_empty() {
            return Err(rejected(400, "Title and description are required"));
        }

        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let now = Utc::now();
        let created = Petition {
            id: format!("mem-{}", state.next_id),
            title: petition.title.clone(),
            description: petition.description.clone(),
            status: Status::Received,
            urgency: false,
            is_duplicate: false,
            assigned_department: None,
            created_at: now,
            status_history: vec![StatusEvent {
                status: Status::Received,
                remarks: "Petition received".to_string(),
                created_at: now,
            }],
        };
        state.owners.insert(created.id.clone(), viewer.id);
        state.petitions.push(created.clone());
        Ok(created)
    }

    fn list_petitions(&self, filter: &PetitionFilter) -> Result<Vec<Petition>, ApiError> {
        self.begin("GET", endpoints::PETITIONS.to_string(), filter.query_pairs())?;
        self.viewer()?;
        let state = self.state.borrow();
        Ok(state
            .petitions
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| Petition {
                status_history: Vec::new(),
                ..p.clone()
            })
            .collect())
    }

    fn petition_stats(&self) -> Result<serde_json::Value, ApiError> {
        self.begin("GET", endpoints::STATS.to_string(), Vec::new())?;
        let viewer = self.viewer()?;
        let state = self.state.borrow();
        match viewer.role {
            Role::Citizen => {
                let mine: Vec<&Petition> = state
                    .petitions
                    .iter()
                    .filter(|p| state.owners.get(&p.id) == Some(&viewer.id))
                    .collect();
                to_value(&CitizenStats {
                    my_petitions: briefs(mine.iter().copied()),
                    status_data: status_counts(mine.iter().copied()),
                })
            }
            Role::Admin => {
                let mut by_department: BTreeMap<String, u64> = BTreeMap::new();
                for p in &state.petitions {
                    let label = p
                        .assigned_department
                        .map_or_else(|| "unassigned".to_string(), |d| d.to_string());
                    *by_department.entry(label).or_default() += 1;
                }
                to_value(&AdminStats {
                    total_petitions: state.petitions.len() as u64,
                    urgent_petitions: state.petitions.iter().filter(|p| p.urgency).count() as u64,
                    pending_assignments: state
                        .petitions
                        .iter()
                        .filter(|p| p.assigned_department.is_none())
                        .count() as u64,
                    department_data: by_department
                        .into_iter()
                        .map(|(department, count)| DepartmentCount { department, count })
                        .collect(),
                })
            }
            Role::Officer => {
                let assigned: Vec<&Petition> = state
                    .petitions
                    .iter()
                    .filter(|p| viewer.is_officer_for(p.assigned_department))
                    .collect();
                to_value(&OfficerStats {
                    assigned_petitions: briefs(assigned.iter().copied()),
                    department_stats: status_counts(assigned.iter().copied()),
                })
            }
        }
    }

    fn get_petition(&self, id: &str) -> Result<Petition, ApiError> {
        self.begin("GET", endpoints::petition(id), Vec::new())?;
        self.viewer()?;
        self.petition(id)
            .ok_or_else(|| rejected(404, "Petition not found"))
    }

    fn update_status(&self, id: &str, update: &StatusUpdate) -> Result<(), ApiError> {
        self.begin("PUT", endpoints::status(id), Vec::new())?;
        let viewer = self.viewer()?;
        let mut state = self.state.borrow_mut();
        let petition = state
            .petitions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| rejected(404, "Petition not found"))?;
        if !viewer.is_officer_for(petition.assigned_department) {
            return Err(rejected(403, "Not authorized to update this petition"));
        }
        if update.status == Status::Unknown {
            return Err(rejected(400, "Invalid status"));
        }
        petition.status = update.status;
        petition.status_history.insert(
            0,
            StatusEvent {
                status: update.status,
                remarks: update.remarks.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn assign_department(&self, id: &str, assignment: &Assignment) -> Result<(), ApiError> {
        self.begin("PUT", endpoints::assign(id), Vec::new())?;
        let viewer = self.viewer()?;
        if viewer.role != Role::Admin {
            return Err(rejected(403, "Only admins can assign departments"));
        }
        let mut state = self.state.borrow_mut();
        let petition = state
            .petitions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| rejected(404, "Petition not found"))?;
        petition.assigned_department = Some(assignment.department);
        petition.status = Status::Assigned;
        petition.status_history.insert(
            0,
            StatusEvent {
                status: Status::Assigned,
                remarks: format!("Assigned to {}", assignment.department),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}
