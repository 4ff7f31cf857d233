//! Single petition with its history and the role-gated workflow actions.
//!
//! After a successful status update or assignment the view re-fetches the
//! petition and adopts the service's copy. It never patches status or
//! history locally, so a failed call leaves nothing to roll back. A failed
//! re-fetch after an accepted change keeps the previous copy on screen.

use serde::Serialize;

use super::{ActionError, Applied, Load};
use crate::api::{Assignment, PetitionApi, StatusUpdate};
use crate::error::{ErrorCode, WorkflowError};
use crate::model::petition::{Department, Petition, Status, TransitionPolicy};
use crate::model::user::{Role, User};
use crate::validate;

pub const FETCH_FAILED: &str = "Failed to fetch petition details";
pub const UPDATE_FAILED: &str = "Failed to update status";
pub const ASSIGN_FAILED: &str = "Failed to assign department";
pub const REFRESH_FAILED: &str = "Change saved, but the petition could not be reloaded";

/// Which workflow actions the current user may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Actions {
    pub update_status: bool,
    pub assign_department: bool,
}

#[derive(Debug)]
pub struct DetailView {
    id: String,
    policy: TransitionPolicy,
    state: Load<Petition>,
    status_draft: Status,
    department_draft: Option<Department>,
    remarks: String,
    action_error: Option<String>,
    load_failure: Option<ErrorCode>,
    history_regressed: bool,
}

impl DetailView {
    #[must_use]
    pub fn new(id: impl AsRef<str>, policy: TransitionPolicy) -> Self {
        Self {
            id: id.as_ref().trim().to_string(),
            policy,
            state: Load::Loading,
            status_draft: Status::Received,
            department_draft: None,
            remarks: String::new(),
            action_error: None,
            load_failure: None,
            history_regressed: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn state(&self) -> &Load<Petition> {
        &self.state
    }

    #[must_use]
    pub const fn petition(&self) -> Option<&Petition> {
        self.state.ready()
    }

    /// Error from the last failed action, shown beside the petition.
    #[must_use]
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    /// Code of the failure that replaced the content, if any.
    #[must_use]
    pub const fn failure_code(&self) -> Option<ErrorCode> {
        self.load_failure
    }

    /// True if a re-fetch ever returned a shorter history than was shown.
    #[must_use]
    pub const fn history_regressed(&self) -> bool {
        self.history_regressed
    }

    #[must_use]
    pub const fn status_draft(&self) -> Status {
        self.status_draft
    }

    #[must_use]
    pub const fn department_draft(&self) -> Option<Department> {
        self.department_draft
    }

    #[must_use]
    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    /// Fetch the petition. A failure drops any previously shown petition.
    pub fn load(&mut self, api: &dyn PetitionApi) {
        if let Err(e) = validate::validate_petition_id(&self.id) {
            self.state = Load::Failed(e.to_string());
            self.load_failure = Some(e.code());
            return;
        }
        match api.get_petition(&self.id) {
            Ok(petition) => self.adopt(petition),
            Err(e) => {
                tracing::warn!(id = %self.id, error = %e, "petition fetch failed");
                self.state = Load::Failed(e.user_message(FETCH_FAILED));
                self.load_failure = Some(e.code());
                self.status_draft = Status::Received;
                self.department_draft = None;
            }
        }
    }

    /// Re-fetch after an accepted change. On failure the shown petition
    /// stays and the failure becomes the action error.
    fn refresh_after_change(&mut self, api: &dyn PetitionApi) -> Applied {
        match api.get_petition(&self.id) {
            Ok(petition) => {
                self.adopt(petition);
                Applied::Refreshed
            }
            Err(e) => {
                tracing::warn!(id = %self.id, error = %e, "re-fetch after change failed");
                let warning = format!("{REFRESH_FAILED}: {}", e.user_message(FETCH_FAILED));
                self.action_error = Some(warning.clone());
                Applied::Stale { warning }
            }
        }
    }

    fn adopt(&mut self, petition: Petition) {
        if let Some(previous) = self.state.ready() {
            if previous.id == petition.id
                && petition.status_history.len() < previous.status_history.len()
            {
                tracing::warn!(
                    id = %petition.id,
                    before = previous.status_history.len(),
                    after = petition.status_history.len(),
                    "status history shrank between fetches"
                );
                self.history_regressed = true;
            }
        }
        for issue in petition.consistency_issues() {
            tracing::warn!(id = %petition.id, %issue, "inconsistent petition");
        }
        self.status_draft = petition.status;
        self.department_draft = petition.assigned_department;
        self.load_failure = None;
        self.state = Load::Ready(petition);
    }

    /// Actions available to `user` on the loaded petition.
    #[must_use]
    pub fn actions(&self, user: &User) -> Actions {
        self.petition().map_or_else(Actions::default, |p| Actions {
            update_status: user.is_officer_for(p.assigned_department),
            assign_department: user.role == Role::Admin,
        })
    }

    /// Status targets the editor offers for the loaded petition.
    #[must_use]
    pub fn status_targets(&self) -> Vec<Status> {
        self.petition()
            .map(|p| self.policy.targets(p.status))
            .unwrap_or_default()
    }

    pub const fn set_status_draft(&mut self, status: Status) {
        self.status_draft = status;
    }

    pub fn set_remarks(&mut self, remarks: impl Into<String>) {
        self.remarks = remarks.into();
    }

    pub const fn select_department(&mut self, department: Option<Department>) {
        self.department_draft = department;
    }

    /// The assign action is disabled while no department is selected.
    #[must_use]
    pub fn can_submit_assignment(&self) -> bool {
        self.department_draft.is_some_and(Department::is_known)
    }

    /// Submit the drafted status and remarks.
    ///
    /// # Errors
    ///
    /// Refused without a request when no petition is loaded, when `user` is
    /// not the officer of the petition's department, or when the transition
    /// policy forbids the move. Otherwise fails with the service's message.
    pub fn update_status(
        &mut self,
        api: &dyn PetitionApi,
        user: &User,
    ) -> Result<Applied, ActionError> {
        let petition = self.petition().ok_or(WorkflowError::NothingLoaded)?;
        if !user.is_officer_for(petition.assigned_department) {
            return Err(WorkflowError::NotPermitted {
                action: "status update",
                role: user.role,
            }
            .into());
        }
        if !self.policy.permits(petition.status, self.status_draft) {
            return Err(WorkflowError::TransitionNotAllowed {
                from: petition.status,
                to: self.status_draft,
            }
            .into());
        }
        let update = StatusUpdate {
            status: self.status_draft,
            remarks: validate::validate_remarks(&self.remarks)?.to_string(),
        };

        if let Err(e) = api.update_status(&self.id, &update) {
            let err = ActionError::from_api(e, UPDATE_FAILED);
            self.action_error = Some(err.to_string());
            return Err(err);
        }
        tracing::info!(id = %self.id, status = %update.status, "status updated");
        self.action_error = None;
        self.remarks.clear();
        Ok(self.refresh_after_change(api))
    }

    /// Assign the selected department.
    ///
    /// # Errors
    ///
    /// Refused without a request when no petition is loaded, when `user` is
    /// not an admin, when no department is selected, or when the petition is
    /// past `assigned` (the service would reset it to `assigned`).
    pub fn assign_department(
        &mut self,
        api: &dyn PetitionApi,
        user: &User,
    ) -> Result<Applied, ActionError> {
        let petition = self.petition().ok_or(WorkflowError::NothingLoaded)?;
        if user.role != Role::Admin {
            return Err(WorkflowError::NotPermitted {
                action: "department assignment",
                role: user.role,
            }
            .into());
        }
        let department = self
            .department_draft
            .filter(|d| d.is_known())
            .ok_or(WorkflowError::DepartmentRequired)?;
        if petition.status.is_after(Status::Assigned) {
            return Err(WorkflowError::WouldRegress {
                status: petition.status,
            }
            .into());
        }

        if let Err(e) = api.assign_department(&self.id, &Assignment { department }) {
            let err = ActionError::from_api(e, ASSIGN_FAILED);
            self.action_error = Some(err.to_string());
            return Err(err);
        }
        tracing::info!(id = %self.id, %department, "department assigned");
        self.action_error = None;
        Ok(self.refresh_after_change(api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::endpoints;
    use crate::api::memory::MemoryApi;
    use crate::error::ApiError;
    use crate::model::petition::StatusEvent;
    use chrono::DateTime;

    fn user(role: Role, department: Option<Department>) -> User {
        User {
            id: format!("{role}-1"),
            first_name: "Pat".into(),
            role,
            department,
        }
    }

    fn petition(status: Status, department: Option<Department>) -> Petition {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        Petition {
            id: "p-1".into(),
            title: "Overflowing bins".into(),
            description: "Bins on Oak Ave not collected for two weeks".into(),
            status,
            urgency: false,
            is_duplicate: false,
            assigned_department: department,
            created_at: at,
            status_history: vec![StatusEvent {
                status: Status::Received,
                remarks: String::new(),
                created_at: at,
            }],
        }
    }

    fn loaded(api: &MemoryApi, p: Petition) -> DetailView {
        let id = api.insert(p);
        let mut view = DetailView::new(id, TransitionPolicy::Unrestricted);
        view.load(api);
        view
    }

    #[test]
    fn load_seeds_drafts() {
        let api = MemoryApi::new().with_viewer(user(Role::Admin, None));
        let view = loaded(&api, petition(Status::Assigned, Some(Department::Housing)));
        assert_eq!(view.status_draft(), Status::Assigned);
        assert_eq!(view.department_draft(), Some(Department::Housing));
    }

    #[test]
    fn update_status_visibility_for_role_and_department() {
        let api = MemoryApi::new().with_viewer(user(Role::Admin, None));
        let view = loaded(&api, petition(Status::Assigned, Some(Department::Health)));

        let cases = [
            (user(Role::Officer, Some(Department::Health)), true),
            (user(Role::Officer, Some(Department::Transport)), false),
            (user(Role::Admin, Some(Department::Health)), false),
            (user(Role::Citizen, None), false),
        ];
        for (who, expected) in cases {
            assert_eq!(
                view.actions(&who).update_status,
                expected,
                "role {} dept {:?}",
                who.role,
                who.department
            );
        }
    }

    #[test]
    fn update_status_refused_for_other_department_without_request() {
        let officer = user(Role::Officer, Some(Department::Transport));
        let api = MemoryApi::new().with_viewer(officer.clone());
        let mut view = loaded(&api, petition(Status::Assigned, Some(Department::Health)));
        let before = api.calls().len();

        view.set_status_draft(Status::Resolved);
        let err = view.update_status(&api, &officer).expect_err("refused");
        assert!(err.is_refused());
        assert_eq!(api.calls().len(), before);
    }

    #[test]
    fn officer_update_adopts_server_copy_and_clears_remarks() {
        let officer = user(Role::Officer, Some(Department::Health));
        let api = MemoryApi::new().with_viewer(officer.clone());
        let mut view = loaded(&api, petition(Status::Assigned, Some(Department::Health)));

        view.set_status_draft(Status::UnderReview);
        view.set_remarks("Inspector scheduled");
        let applied = view.update_status(&api, &officer).expect("update");
        assert_eq!(applied, Applied::Refreshed);

        let p = view.petition().expect("loaded");
        assert_eq!(p.status, Status::UnderReview);
        assert_eq!(p.status_history.len(), 2);
        assert_eq!(p.status_history[0].remarks, "Inspector scheduled");
        assert_eq!(view.remarks(), "");
        assert!(!view.history_regressed());
    }

    #[test]
    fn failed_update_keeps_petition_and_remarks() {
        let officer = user(Role::Officer, Some(Department::Health));
        let api = MemoryApi::new().with_viewer(officer.clone());
        let mut view = loaded(&api, petition(Status::Assigned, Some(Department::Health)));

        view.set_status_draft(Status::Resolved);
        view.set_remarks("done");
        api.fail_next(ApiError::Rejected {
            status: 500,
            message: None,
        });
        let err = view.update_status(&api, &officer).expect_err("fails");
        assert_eq!(err.to_string(), UPDATE_FAILED);
        assert_eq!(view.action_error(), Some(UPDATE_FAILED));
        assert_eq!(view.petition().map(|p| p.status), Some(Status::Assigned));
        assert_eq!(view.remarks(), "done");
    }

    #[test]
    fn forward_only_policy_refuses_backwards_move() {
        let officer = user(Role::Officer, Some(Department::Health));
        let api = MemoryApi::new().with_viewer(officer.clone());
        let id = api.insert(petition(Status::Resolved, Some(Department::Health)));
        let mut view = DetailView::new(id, TransitionPolicy::ForwardOnly);
        view.load(&api);

        assert_eq!(view.status_targets(), vec![Status::Resolved]);
        view.set_status_draft(Status::Received);
        let err = view.update_status(&api, &officer).expect_err("refused");
        assert!(matches!(
            err,
            ActionError::Refused(WorkflowError::TransitionNotAllowed { .. })
        ));
    }

    #[test]
    fn admin_assigns_health_to_received_petition() {
        let admin = user(Role::Admin, None);
        let api = MemoryApi::new().with_viewer(admin.clone());
        let mut view = loaded(&api, petition(Status::Received, None));

        view.select_department(Some(Department::Health));
        let applied = view.assign_department(&api, &admin).expect("assign");
        assert!(applied.warning().is_none());

        let p = view.petition().expect("loaded");
        assert_eq!(p.status, Status::Assigned);
        assert_eq!(p.assigned_department, Some(Department::Health));
        assert_eq!(view.status_draft(), Status::Assigned);
    }

    #[test]
    fn empty_department_issues_no_request() {
        let admin = user(Role::Admin, None);
        let api = MemoryApi::new().with_viewer(admin.clone());
        let mut view = loaded(&api, petition(Status::Received, None));
        let before = api.calls().len();

        assert!(!view.can_submit_assignment());
        let err = view.assign_department(&api, &admin).expect_err("refused");
        assert_eq!(
            err,
            ActionError::Refused(WorkflowError::DepartmentRequired)
        );
        assert_eq!(api.calls().len(), before);
    }

    #[test]
    fn assigning_resolved_petition_is_refused() {
        let admin = user(Role::Admin, None);
        let api = MemoryApi::new().with_viewer(admin.clone());
        let mut view = loaded(&api, petition(Status::Resolved, Some(Department::Housing)));
        view.select_department(Some(Department::Health));

        let err = view.assign_department(&api, &admin).expect_err("refused");
        assert!(matches!(
            err,
            ActionError::Refused(WorkflowError::WouldRegress { .. })
        ));
        let stored = api.petition("p-1").expect("stored");
        assert_eq!(stored.status, Status::Resolved);
    }

    #[test]
    fn assigning_under_review_petition_is_refused_without_request() {
        let admin = user(Role::Admin, None);
        let api = MemoryApi::new().with_viewer(admin.clone());
        let mut view = loaded(&api, petition(Status::UnderReview, Some(Department::Housing)));
        view.select_department(Some(Department::Health));
        let before = api.calls().len();

        let err = view.assign_department(&api, &admin).expect_err("refused");
        assert_eq!(
            err,
            ActionError::Refused(WorkflowError::WouldRegress {
                status: Status::UnderReview
            })
        );
        assert_eq!(api.calls().len(), before);
        let stored = api.petition("p-1").expect("stored");
        assert_eq!(stored.status, Status::UnderReview);
        assert_eq!(stored.assigned_department, Some(Department::Housing));
    }

    #[test]
    fn reassigning_an_assigned_petition_is_allowed() {
        let admin = user(Role::Admin, None);
        let api = MemoryApi::new().with_viewer(admin.clone());
        let mut view = loaded(&api, petition(Status::Assigned, Some(Department::Housing)));
        view.select_department(Some(Department::Education));

        let applied = view.assign_department(&api, &admin).expect("assign");
        assert_eq!(applied, Applied::Refreshed);
        assert_eq!(
            view.petition().and_then(|p| p.assigned_department),
            Some(Department::Education)
        );
    }

    #[test]
    fn unrecognized_department_cannot_be_submitted() {
        let admin = user(Role::Admin, None);
        let api = MemoryApi::new().with_viewer(admin.clone());
        let mut view = loaded(&api, petition(Status::Received, None));
        view.select_department(Some(Department::Unknown));

        assert!(!view.can_submit_assignment());
        let err = view.assign_department(&api, &admin).expect_err("refused");
        assert_eq!(err, ActionError::Refused(WorkflowError::DepartmentRequired));
    }

    #[test]
    fn failed_refresh_after_update_keeps_petition_and_reports_success() {
        let officer = user(Role::Officer, Some(Department::Health));
        let api = MemoryApi::new().with_viewer(officer.clone());
        let mut view = loaded(&api, petition(Status::Assigned, Some(Department::Health)));

        api.fail_request(
            "GET",
            endpoints::petition("p-1"),
            ApiError::Transport("connection reset".into()),
        );
        view.set_status_draft(Status::Resolved);
        view.set_remarks("Bins collected");
        let applied = view.update_status(&api, &officer).expect("update accepted");

        let warning = applied.warning().expect("stale");
        assert!(warning.starts_with(REFRESH_FAILED));
        assert_eq!(view.action_error(), Some(warning));
        assert!(view.state().error().is_none());
        assert_eq!(view.petition().map(|p| p.status), Some(Status::Assigned));
        assert_eq!(view.remarks(), "");
        let stored = api.petition("p-1").expect("stored");
        assert_eq!(stored.status, Status::Resolved);
        assert_eq!(stored.status_history.len(), 2);
    }

    #[test]
    fn failed_refresh_after_assignment_keeps_petition() {
        let admin = user(Role::Admin, None);
        let api = MemoryApi::new().with_viewer(admin.clone());
        let mut view = loaded(&api, petition(Status::Received, None));

        api.fail_request(
            "GET",
            endpoints::petition("p-1"),
            ApiError::Rejected {
                status: 503,
                message: None,
            },
        );
        view.select_department(Some(Department::Transport));
        let applied = view.assign_department(&api, &admin).expect("assign accepted");

        assert!(matches!(applied, Applied::Stale { .. }));
        assert!(view.petition().is_some());
        assert_eq!(
            api.petition("p-1").and_then(|p| p.assigned_department),
            Some(Department::Transport)
        );
    }

    #[test]
    fn non_admin_cannot_assign() {
        let officer = user(Role::Officer, Some(Department::Health));
        let api = MemoryApi::new().with_viewer(officer.clone());
        let mut view = loaded(&api, petition(Status::Received, None));
        view.select_department(Some(Department::Health));
        assert!(!view.actions(&officer).assign_department);
        assert!(view.assign_department(&api, &officer).is_err());
    }

    #[test]
    fn not_found_leaves_only_the_error() {
        let api = MemoryApi::new().with_viewer(user(Role::Citizen, None));
        let mut view = loaded(&api, petition(Status::Received, None));
        assert!(view.petition().is_some());

        api.fail_next(ApiError::Rejected {
            status: 404,
            message: Some("Petition not found".into()),
        });
        view.load(&api);
        assert!(view.petition().is_none());
        assert_eq!(view.state().error(), Some("Petition not found"));
        assert_eq!(view.failure_code(), Some(ErrorCode::PetitionNotFound));
        assert_eq!(view.actions(&user(Role::Admin, None)), Actions::default());
    }

    #[test]
    fn unknown_id_fails_with_fallback_when_server_is_silent() {
        let api = MemoryApi::new().with_viewer(user(Role::Citizen, None));
        api.fail_next(ApiError::Rejected {
            status: 404,
            message: None,
        });
        let mut view = DetailView::new("missing", TransitionPolicy::Unrestricted);
        view.load(&api);
        assert_eq!(view.state().error(), Some(FETCH_FAILED));
    }

    #[test]
    fn padded_id_is_requested_trimmed() {
        let api = MemoryApi::new().with_viewer(user(Role::Citizen, None));
        api.insert(petition(Status::Received, None));
        let mut view = DetailView::new(" p-1 ", TransitionPolicy::Unrestricted);
        view.load(&api);

        assert_eq!(view.id(), "p-1");
        assert!(view.petition().is_some());
        assert_eq!(api.calls()[0].path, endpoints::petition("p-1"));
    }

    #[test]
    fn unsafe_id_fails_without_request() {
        let api = MemoryApi::new().with_viewer(user(Role::Citizen, None));
        let mut view = DetailView::new("1/assign", TransitionPolicy::Unrestricted);
        view.load(&api);
        assert!(view.state().error().is_some());
        assert_eq!(view.failure_code(), Some(ErrorCode::InvalidField));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn shrinking_history_is_flagged() {
        let api = MemoryApi::new().with_viewer(user(Role::Citizen, None));
        let mut view = loaded(&api, petition(Status::Received, None));

        let mut trimmed = petition(Status::Received, None);
        trimmed.status_history.clear();
        view.adopt(trimmed);
        assert!(view.history_regressed());
    }
}
