//! Field checks applied before a request is built.

use crate::error::WorkflowError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_REMARKS_LEN: usize = 2000;

/// Trim `value` and require it to be non-empty.
///
/// # Errors
///
/// Returns [`WorkflowError::EmptyField`] for blank input.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::EmptyField { field });
    }
    Ok(trimmed)
}

/// # Errors
///
/// Returns an error if the title is blank, too long, or contains control
/// characters.
pub fn validate_title(s: &str) -> Result<&str, WorkflowError> {
    let title = required("title", s)?;
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(WorkflowError::InvalidField {
            field: "title",
            reason: format!("must be <= {MAX_TITLE_LEN} characters"),
        });
    }
    if title.chars().any(char::is_control) {
        return Err(WorkflowError::InvalidField {
            field: "title",
            reason: "must not contain control characters".to_string(),
        });
    }
    Ok(title)
}

/// # Errors
///
/// Returns an error if the description is blank.
pub fn validate_description(s: &str) -> Result<&str, WorkflowError> {
    required("description", s)
}

/// Remarks are optional, but bounded.
///
/// # Errors
///
/// Returns an error if the remarks exceed [`MAX_REMARKS_LEN`].
pub fn validate_remarks(s: &str) -> Result<&str, WorkflowError> {
    let remarks = s.trim();
    if remarks.chars().count() > MAX_REMARKS_LEN {
        return Err(WorkflowError::InvalidField {
            field: "remarks",
            reason: format!("must be <= {MAX_REMARKS_LEN} characters"),
        });
    }
    Ok(remarks)
}

/// Petition ids are opaque, but end up in a URL path.
///
/// # Errors
///
/// Returns an error for blank ids or ids containing `/`, `?`, `#` or
/// whitespace.
pub fn validate_petition_id(s: &str) -> Result<&str, WorkflowError> {
    let id = required("petition id", s)?;
    if id.chars().any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace()) {
        return Err(WorkflowError::InvalidField {
            field: "petition id",
            reason: "must not contain '/', '?', '#' or whitespace".to_string(),
        });
    }
    Ok(id)
}
