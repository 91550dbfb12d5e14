//! Error types surfaced by the model layer.
//!
//! Two families exist:
//!
//! - [`ModelError`]: a business rule was violated. These are expected,
//!   recoverable and carry enough context (login, code, count, value) for
//!   the caller to act on them.
//! - Everything else in [`ModelMgrError`]: technical failures (storage, I/O,
//!   XML syntax). The enclosing transaction is always rolled back and the
//!   detail is logged rather than shown to end users.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    // === COLLABORATORS ===
    #[error("Login '{0}' is already in use")]
    LoginAlreadyInUse(String),
    #[error("Collaborator #{0} does not exist")]
    CollaboratorNotFound(i64),
    #[error("Collaborator '{login}' has {count} contribution(s) and cannot be removed")]
    CollaboratorHasContributions { login: String, count: i64 },
    #[error("Unknown collaborator login '{0}'")]
    UnknownLogin(String),

    // === DURATIONS ===
    #[error("Invalid duration {0}: a duration must be strictly positive")]
    InvalidDuration(i64),
    #[error("Duration {0} already exists")]
    DurationAlreadyExists(i64),
    #[error("Duration {0} does not exist")]
    DurationNotFound(i64),
    #[error("Duration {id} is used by {count} contribution(s)")]
    DurationInUse { id: i64, count: i64 },

    // === TASKS ===
    #[error("Task #{0} does not exist")]
    TaskNotFound(i64),
    #[error("Invalid task code '{0}': a code must be non-empty and must not contain '/'")]
    InvalidTaskCode(String),
    #[error("Code '{code}' is already used by a sibling task")]
    CodeAlreadyInUse { code: String },
    #[error("A task with code '{code}' already exists at the destination")]
    CodeExistsAtDestination { code: String },
    #[error("Task '{code}' has {count} contribution(s) and cannot accept sub tasks")]
    TaskInUse { code: String, count: i64 },
    #[error("Task '{code}' has a non null budget and cannot accept sub tasks")]
    NonNullBudget { code: String },
    #[error("Task '{code}' has a non null initially consumed amount and cannot accept sub tasks")]
    NonNullInitiallyConsumed { code: String },
    #[error("Task '{code}' has a non null estimated time to complete and cannot accept sub tasks")]
    NonNullTodo { code: String },
    #[error("Task '{code}' cannot be removed: {count} contribution(s) exist in its sub tree")]
    TaskHasContributions { code: String, count: i64 },
    #[error("Task '{code}' has sub tasks and cannot accept contributions")]
    TaskWithSubtaskCannotAcceptContributions { code: String },
    #[error("Task '{code}' is already the first one")]
    CannotMoveUp { code: String },
    #[error("Task '{code}' is already the last one")]
    CannotMoveDown { code: String },
    #[error("Task '{code}' cannot be moved under itself")]
    CannotMoveUnderItself { code: String },
    #[error("Invalid number {number} for task '{code}': expected a value between 1 and {max}")]
    InvalidTaskNumber { code: String, number: i64, max: i64 },
    #[error("Task '{code}' cannot hold more than {max} sub tasks")]
    TooManySubtasks { code: String, max: u8 },
    #[error("Task '{code}' was modified by another operation (path or number changed)")]
    StaleTask { code: String },
    #[error("Unknown task code path '{0}'")]
    UnknownTaskCodePath(String),

    // === CONTRIBUTIONS ===
    #[error("Contribution of collaborator #{contributor_id} on task #{task_id} dated {date} does not exist")]
    ContributionNotFound { contributor_id: i64, task_id: i64, date: NaiveDate },
    #[error("Contribution of collaborator #{contributor_id} on task #{task_id} dated {date} was modified by another operation")]
    StaleContribution { contributor_id: i64, task_id: i64, date: NaiveDate },
    #[error("Collaborator #{contributor_id} already contributed to task #{task_id} on {date}")]
    ContributionAlreadyExists { contributor_id: i64, task_id: i64, date: NaiveDate },
    #[error("A contributor must be specified")]
    ContributorRequired,
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

#[derive(Debug, Error)]
pub enum ModelMgrError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("XML failure: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid XML document at '{element}': {message}")]
    XmlImport { element: String, message: String },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
}

impl ModelMgrError {
    /// Tells whether the failure is a business rule violation the caller may recover from.
    pub fn is_model_violation(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    /// Returns the business rule violation, if any.
    pub fn as_model_error(&self) -> Option<&ModelError> {
        match self {
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for ModelMgrError {
    fn from(value: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(value.into())
    }
}

pub type ModelMgrResult<T> = Result<T, ModelMgrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_violations_are_recognised() {
        let err: ModelMgrError = ModelError::ContributorRequired.into();
        assert!(err.is_model_violation());
        assert_eq!(err.as_model_error(), Some(&ModelError::ContributorRequired));

        let err: ModelMgrError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(!err.is_model_violation());
        assert!(err.as_model_error().is_none());
    }

    #[test]
    fn messages_carry_context() {
        let err = ModelError::TaskHasContributions { code: "DEV".to_string(), count: 3 };
        assert_eq!(err.to_string(), "Task 'DEV' cannot be removed: 3 contribution(s) exist in its sub tree");
    }
}
