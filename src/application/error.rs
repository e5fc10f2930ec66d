use serde::Serialize;
use thiserror::Error;

use crate::domain::{AggregateError, SplitError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Unsupported split method: {0}")]
    UnsupportedSplitMethod(String),

    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("Participant already exists: {0}")]
    ParticipantAlreadyExists(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// Stable error category that outer layers map to their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidSplit,
    UnsupportedSplitMethod,
    InvalidExpense,
    NotFound,
    ParticipantNotFound,
    ParticipantAlreadyExists,
    Storage,
}

/// Serializable `{ kind, message }` form of an [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidSplit(_) => ErrorKind::InvalidSplit,
            AppError::UnsupportedSplitMethod(_) => ErrorKind::UnsupportedSplitMethod,
            AppError::InvalidExpense(_) => ErrorKind::InvalidExpense,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::ParticipantNotFound(_) => ErrorKind::ParticipantNotFound,
            AppError::ParticipantAlreadyExists(_) => ErrorKind::ParticipantAlreadyExists,
            AppError::Database(_) => ErrorKind::Storage,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::InvalidSplit(msg) => AppError::InvalidSplit(msg),
            SplitError::UnsupportedSplitMethod(tag) => AppError::UnsupportedSplitMethod(tag),
            SplitError::InvalidExpense(msg) => AppError::InvalidExpense(msg),
        }
    }
}

impl From<AggregateError> for AppError {
    fn from(err: AggregateError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_errors_keep_their_kind() {
        let err: AppError = SplitError::InvalidSplit("percentages must add up to 100%".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidSplit);

        let err: AppError = SplitError::UnsupportedSplitMethod("shares".into()).into();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSplitMethod);
        assert_eq!(err.to_string(), "Unsupported split method: shares");
    }

    #[test]
    fn test_report_serializes_kind_and_message() {
        let err: AppError = AggregateError::NotFound(uuid::Uuid::nil()).into();
        let json = serde_json::to_value(err.report()).unwrap();

        assert_eq!(json["kind"], "NotFound");
        assert_eq!(
            json["message"],
            "No expenses found for participant 00000000-0000-0000-0000-000000000000"
        );
    }
}
