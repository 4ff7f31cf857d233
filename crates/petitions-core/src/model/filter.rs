//! List filter and its query-string encoding.

use serde::Serialize;

use super::petition::{Department, Petition, Status};

/// Optional, independently combinable list filters (logical AND).
///
/// Compared by value: the list view refetches only when a new filter is not
/// equal to the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PetitionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl PetitionFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    /// Set the free-text search. Blank input clears it.
    #[must_use]
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        let trimmed = search.as_ref().trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Query parameters for `GET /api/petitions`, containing exactly the
    /// non-empty fields.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(status) = self.status.filter(|s| *s != Status::Unknown) {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(department) = self.department.filter(|d| d.is_known()) {
            pairs.push(("department", department.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                pairs.push(("search", search.to_string()));
            }
        }
        pairs
    }

    /// Local evaluation of the service's matching contract: exact status and
    /// department, case-insensitive substring search over title and
    /// description.
    #[must_use]
    pub fn matches(&self, petition: &Petition) -> bool {
        if let Some(status) = self.status {
            if petition.status != status {
                return false;
            }
        }
        if let Some(department) = self.department {
            if petition.assigned_department != Some(department) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !petition.title.to_lowercase().contains(&needle)
                && !petition.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use proptest::prelude::*;

    fn petition(title: &str, description: &str) -> Petition {
        Petition {
            id: "1".into(),
            title: title.into(),
            description: description.into(),
            status: Status::Assigned,
            urgency: false,
            is_duplicate: false,
            assigned_department: Some(Department::Transport),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            status_history: Vec::new(),
        }
    }

    #[test]
    fn empty_filter_sends_nothing() {
        assert!(PetitionFilter::new().query_pairs().is_empty());
        assert!(PetitionFilter::new().with_search("   ").query_pairs().is_empty());
    }

    #[test]
    fn full_filter_sends_all_three() {
        let filter = PetitionFilter::new()
            .with_status(Status::UnderReview)
            .with_department(Department::Housing)
            .with_search(" mold ");
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("status", "under_review".to_string()),
                ("department", "housing".to_string()),
                ("search", "mold".to_string()),
            ]
        );
    }

    #[test]
    fn raw_blank_search_is_not_sent() {
        let filter = PetitionFilter {
            search: Some("  ".into()),
            ..PetitionFilter::default()
        };
        assert!(filter.query_pairs().is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let p = petition("Pothole on Main St", "Large pothole causing damage");
        assert!(PetitionFilter::new().with_search("POTHOLE").matches(&p));
        assert!(PetitionFilter::new().with_search("damage").matches(&p));
        assert!(!PetitionFilter::new().with_search("streetlight").matches(&p));
    }

    #[test]
    fn fields_combine_with_and() {
        let p = petition("Pothole", "");
        let hit = PetitionFilter::new()
            .with_status(Status::Assigned)
            .with_department(Department::Transport);
        assert!(hit.matches(&p));
        let miss = hit.clone().with_department(Department::Health);
        assert!(!miss.matches(&p));
    }

    fn arb_status() -> impl Strategy<Value = Option<Status>> {
        proptest::option::of(proptest::sample::select(Status::EDITABLE.to_vec()))
    }

    fn arb_department() -> impl Strategy<Value = Option<Department>> {
        proptest::option::of(proptest::sample::select(Department::ALL.to_vec()))
    }

    proptest! {
        #[test]
        fn only_non_empty_fields_are_sent(
            status in arb_status(),
            department in arb_department(),
            search in proptest::option::of("[ a-z]{0,8}"),
        ) {
            let filter = PetitionFilter { status, department, search: search.clone() };
            let pairs = filter.query_pairs();
            let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();

            prop_assert_eq!(keys.contains(&"status"), status.is_some());
            prop_assert_eq!(keys.contains(&"department"), department.is_some());
            let has_search = search.as_deref().is_some_and(|s| !s.trim().is_empty());
            prop_assert_eq!(keys.contains(&"search"), has_search);
            for (_, value) in &pairs {
                prop_assert!(!value.trim().is_empty());
            }
        }
    }
}
