use crate::domain::{CandidateId, CommitmentId, EventId, Week};
use crate::engine::AmountOverflow;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Coarse classification of ledger failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Storage => "storage",
        }
    }
}

/// Errors raised by the registries, planner and ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),
    #[error("event {0} not found")]
    EventNotFound(EventId),
    #[error("no event scheduled for week {0}")]
    WeekNotFound(Week),
    #[error("no current or upcoming event")]
    NoCurrentEvent,
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("commitment {0} not found")]
    CommitmentNotFound(CommitmentId),
    #[error("event {0} is already complete")]
    EventCompleted(EventId),
    #[error("event {0} already has a commitment")]
    DuplicateCommitment(EventId),
    #[error("{}", already_committed_message(.candidate_id, .week))]
    CandidateAlreadyCommitted {
        candidate_id: CandidateId,
        week: Option<Week>,
    },
    #[error("week {0} was reserved concurrently")]
    ReservationCollision(Week),
    #[error("commitment {0} already has a different result recorded")]
    ResultAlreadyRecorded(CommitmentId),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

fn already_committed_message(candidate_id: &CandidateId, week: &Option<Week>) -> String {
    match week {
        Some(week) => format!("candidate {} was already used in week {}", candidate_id, week),
        None => format!("candidate {} was already used", candidate_id),
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::EventNotFound(_)
            | LedgerError::WeekNotFound(_)
            | LedgerError::NoCurrentEvent
            | LedgerError::CandidateNotFound(_)
            | LedgerError::CommitmentNotFound(_) => ErrorKind::NotFound,
            LedgerError::EventCompleted(_)
            | LedgerError::DuplicateCommitment(_)
            | LedgerError::CandidateAlreadyCommitted { .. }
            | LedgerError::ReservationCollision(_)
            | LedgerError::ResultAlreadyRecorded(_) => ErrorKind::Conflict,
            LedgerError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<AmountOverflow> for LedgerError {
    fn from(err: AmountOverflow) -> Self {
        LedgerError::Validation(err.to_string())
    }
}

/// Whether a storage error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => AppError::BadRequest(message),
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::Conflict => AppError::Conflict(message),
            ErrorKind::Storage => {
                tracing::error!(error = %message, "Storage failure");
                AppError::Internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, error_message) = match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "storage", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}
