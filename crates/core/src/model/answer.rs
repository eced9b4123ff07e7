use serde::Serialize;
use std::collections::BTreeMap;

use super::task::TaskType;

/// A reader's answer, shaped after the task it answers.
///
/// Serializes to the bare wire value the backend expects in the `answer`
/// field: an option index, a string, a term→definition map, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    /// Selected option index of a choice task.
    Choice(usize),
    /// Free text filling a cloze gap.
    Text(String),
    /// Term → definition pairs placed by the reader.
    Matching(BTreeMap<String, String>),
    Typing { text: String },
    Highlight { phrases: Vec<String> },
    /// One selected option index per boss question, in order.
    Boss(Vec<usize>),
}

impl Answer {
    /// Whether this answer shape can be submitted for the given task type.
    #[must_use]
    pub fn fits(&self, task_type: TaskType) -> bool {
        matches!(
            (self, task_type),
            (Answer::Choice(_), TaskType::Choice)
                | (Answer::Text(_), TaskType::Cloze)
                | (Answer::Matching(_), TaskType::Matching)
                | (Answer::Typing { .. }, TaskType::Typing)
                | (Answer::Highlight { .. }, TaskType::Highlight)
                | (Answer::Boss(_), TaskType::Boss)
        )
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Answer::Choice(_) => "choice",
            Answer::Text(_) => "text",
            Answer::Matching(_) => "matching",
            Answer::Typing { .. } => "typing",
            Answer::Highlight { .. } => "highlight",
            Answer::Boss(_) => "boss",
        }
    }
}
