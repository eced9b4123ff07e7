//! Shared error types for the services crate.

use thiserror::Error;

use client::ApiError;
use hurdle_core::model::TaskType;

/// Errors emitted by the session state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no document session is active")]
    NoSession,
    #[error("no question is loaded")]
    NoHurdle,
    #[error("another request is still in progress")]
    Busy,
    #[error("the session is not finished yet")]
    NotDone,
    #[error("the session is already finished")]
    AlreadyDone,
    #[error("this question is already answered; continue to the next one")]
    AlreadyAnswered,
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("a {got} answer cannot be submitted for a {expected} task")]
    AnswerMismatch {
        expected: TaskType,
        got: &'static str,
    },
    #[error("the session was restarted while the request was in flight")]
    Superseded,
    #[error(transparent)]
    Api(#[from] ApiError),
}
