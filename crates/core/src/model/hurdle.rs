use serde::Deserialize;
use serde_json::Value;

use crate::error::ModelError;

use super::task::{Task, TaskType};

/// Position of a multi-question hurdle within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QuestionProgress {
    pub current_question: u32,
    pub total_questions: u32,
    pub chunk_number: u32,
    pub total_chunks: u32,
}

/// The currently active question unit: a chunk of text plus its task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawHurdle")]
pub struct Hurdle {
    pub chunk: String,
    pub task: Task,
    pub is_boss: bool,
    pub idx: u32,
    pub difficulty: Option<u32>,
    pub key_concepts: Vec<String>,
    pub document_text: Option<String>,
    pub document_title: Option<String>,
    pub question_progress: Option<QuestionProgress>,
}

impl Hurdle {
    #[must_use]
    pub fn task_type(&self) -> TaskType {
        self.task.task_type()
    }
}

#[derive(Deserialize)]
struct RawHurdle {
    #[serde(default)]
    chunk: String,
    task: Value,
    task_type: TaskType,
    #[serde(default)]
    is_boss: bool,
    #[serde(default)]
    idx: u32,
    difficulty: Option<u32>,
    #[serde(default)]
    key_concepts: Vec<String>,
    document_text: Option<String>,
    document_title: Option<String>,
    question_progress: Option<QuestionProgress>,
}

impl TryFrom<RawHurdle> for Hurdle {
    type Error = ModelError;

    fn try_from(raw: RawHurdle) -> Result<Self, Self::Error> {
        let task = Task::from_value(raw.task_type, raw.task)?;
        Ok(Self {
            chunk: raw.chunk,
            is_boss: raw.is_boss || task.task_type() == TaskType::Boss,
            task,
            idx: raw.idx,
            difficulty: raw.difficulty,
            key_concepts: raw.key_concepts,
            document_text: raw.document_text,
            document_title: raw.document_title,
            question_progress: raw.question_progress,
        })
    }
}

/// Result of asking the server for the next hurdle.
#[derive(Debug, Clone, PartialEq)]
pub enum HurdleFetch {
    /// Every chunk has been cleared.
    Done,
    Next(Box<Hurdle>),
}

impl HurdleFetch {
    /// Interpret a `GET /api/hurdle/{id}` body.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Malformed` when the body is neither a completion
    /// marker nor a hurdle.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        if value.get("done").and_then(Value::as_bool) == Some(true) {
            return Ok(Self::Done);
        }
        let hurdle: Hurdle =
            serde_json::from_value(value).map_err(|err| ModelError::malformed("hurdle", err))?;
        Ok(Self::Next(Box::new(hurdle)))
    }
}
