use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ModelError;

//
// ─── TASK TYPE ─────────────────────────────────────────────────────────────────
//

/// Tag identifying which kind of question a hurdle carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Choice,
    Cloze,
    Matching,
    Typing,
    Highlight,
    Boss,
}

impl TaskType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Choice => "choice",
            TaskType::Cloze => "cloze",
            TaskType::Matching => "matching",
            TaskType::Typing => "typing",
            TaskType::Highlight => "highlight",
            TaskType::Boss => "boss",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── TASK PAYLOADS ─────────────────────────────────────────────────────────────
//

/// Multiple-choice question. The correct index stays on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceTask {
    pub question: String,
    pub options: Vec<String>,
    pub explanation: Option<String>,
    pub hint: Option<String>,
}

/// Fill-in-the-blank sentence using `_____` for the gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClozeTask {
    #[serde(alias = "prompt")]
    pub question: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub term: String,
    pub definition: String,
}

/// Drag terms onto definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingTask {
    pub concepts: Vec<Concept>,
    /// Definitions as presented to the reader, possibly shuffled.
    #[serde(default)]
    pub definitions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingTask {
    #[serde(default = "default_typing_text")]
    pub typing_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightTask {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target_phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub explanation: Option<String>,
}

/// Multi-question review covering the last few chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTask {
    #[serde(default = "default_boss_title")]
    pub title: String,
    pub questions: Vec<BossQuestion>,
    pub difficulty: Option<u32>,
}

fn default_typing_text() -> String {
    "Type this important concept from your PDF!".to_owned()
}

fn default_boss_title() -> String {
    "Boss Battle".to_owned()
}

//
// ─── TASK ──────────────────────────────────────────────────────────────────────
//

/// The question part of a hurdle, one variant per task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Task {
    Choice(ChoiceTask),
    Cloze(ClozeTask),
    Matching(MatchingTask),
    Typing(TypingTask),
    Highlight(HighlightTask),
    Boss(BossTask),
}

impl Task {
    /// Decode a task payload using the hurdle-level `task_type`.
    ///
    /// Boss payloads come without a `type` field, so the tag is filled in from
    /// the hurdle. A payload that names its own type must agree with it.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::TaskTypeMismatch` when the tags disagree and
    /// `ModelError::Malformed` when the payload does not fit the variant.
    pub fn from_value(task_type: TaskType, value: Value) -> Result<Self, ModelError> {
        let Value::Object(mut fields) = value else {
            return Err(ModelError::malformed("task", "expected a JSON object"));
        };

        let declared = fields.get("type").and_then(Value::as_str).map(str::to_owned);
        match declared {
            Some(found) if found != task_type.as_str() => {
                return Err(ModelError::TaskTypeMismatch {
                    expected: task_type,
                    found,
                });
            }
            Some(_) => {}
            None => {
                fields.insert("type".to_owned(), Value::from(task_type.as_str()));
            }
        }

        let mut task: Task = serde_json::from_value(Value::Object(fields))
            .map_err(|err| ModelError::malformed("task", err))?;
        if let Task::Matching(matching) = &mut task {
            if matching.definitions.is_empty() {
                matching.definitions = matching
                    .concepts
                    .iter()
                    .map(|concept| concept.definition.clone())
                    .collect();
            }
        }
        Ok(task)
    }

    #[must_use]
    pub fn task_type(&self) -> TaskType {
        match self {
            Task::Choice(_) => TaskType::Choice,
            Task::Cloze(_) => TaskType::Cloze,
            Task::Matching(_) => TaskType::Matching,
            Task::Typing(_) => TaskType::Typing,
            Task::Highlight(_) => TaskType::Highlight,
            Task::Boss(_) => TaskType::Boss,
        }
    }

    /// Short prompt line for list views and logs.
    #[must_use]
    pub fn headline(&self) -> &str {
        match self {
            Task::Choice(task) => &task.question,
            Task::Cloze(task) => &task.question,
            Task::Matching(_) => "Match the concepts",
            Task::Typing(task) => &task.typing_text,
            Task::Highlight(_) => "Highlight the key phrases",
            Task::Boss(task) => &task.title,
        }
    }
}
