use thiserror::Error;

use crate::model::TaskType;

/// Errors raised while building or decoding domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("document id must not be empty")]
    EmptyPdfId,

    #[error("task payload says `{found}` but the hurdle says `{expected}`")]
    TaskTypeMismatch { expected: TaskType, found: String },

    #[error("malformed {kind} payload: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

impl ModelError {
    pub(crate) fn malformed(kind: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            kind,
            reason: err.to_string(),
        }
    }
}
