use thiserror::Error;

use crate::models::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("Please enter the {0}")]
    MissingField(&'static str),
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Invalid {role} ID. Please try again.")]
    UnknownId { role: Role, id: String },
    #[error("No {what} with id {id}")]
    NotFound { what: &'static str, id: String },
    #[error("Student {0} is not one of your mentees")]
    NotMentee(String),
}

impl DashboardError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DashboardError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        DashboardError::NotFound {
            what,
            id: id.to_string(),
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Presence check shared by every form: trims the value and refuses blanks.
pub fn required<'a>(field: &'static str, value: &'a str) -> DashboardResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DashboardError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
