use serde::Deserialize;

use super::progress::ProgressUpdate;

/// Body of a `POST /api/hurdle/{id}` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmitOutcome {
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub score: f64,
    pub explanation: Option<String>,
    pub feedback: Option<String>,
    pub hint: Option<String>,
    pub points_earned: Option<u32>,
    pub message: Option<String>,
    #[serde(default)]
    pub current: Option<u32>,
    /// Older servers report the position under this name.
    #[serde(default)]
    pub new_progress: Option<u32>,
    pub xp: Option<u32>,
    pub streak: Option<u32>,
}

impl SubmitOutcome {
    #[must_use]
    pub fn progress_update(&self) -> ProgressUpdate {
        ProgressUpdate {
            current: self.current.max(self.new_progress),
            xp: self.xp,
            streak: self.streak,
        }
    }

    fn explanation_text(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .or(self.feedback.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Correct,
    Incorrect,
    Skipped,
}

/// Transient result of the last submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub outcome: FeedbackOutcome,
    pub score: f64,
    pub explanation: String,
    pub hint: Option<String>,
    pub points_earned: Option<u32>,
    pub message: Option<String>,
}

impl Feedback {
    #[must_use]
    pub fn from_submission(outcome: &SubmitOutcome) -> Self {
        Self {
            outcome: if outcome.correct {
                FeedbackOutcome::Correct
            } else {
                FeedbackOutcome::Incorrect
            },
            score: outcome.score,
            explanation: outcome.explanation_text().unwrap_or_default().to_owned(),
            hint: outcome.hint.clone(),
            points_earned: outcome.points_earned,
            message: outcome.message.clone(),
        }
    }

    /// Feedback shown after a skip: no score, only the server's note.
    #[must_use]
    pub fn skipped(outcome: &SubmitOutcome) -> Self {
        Self {
            outcome: FeedbackOutcome::Skipped,
            score: 0.0,
            explanation: outcome
                .explanation_text()
                .unwrap_or("Question skipped.")
                .to_owned(),
            hint: outcome.hint.clone(),
            points_earned: None,
            message: outcome.message.clone(),
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.outcome == FeedbackOutcome::Correct
    }
}
