use std::env;
use std::time::Duration;

use hurdle_core::model::{Feedback, FeedbackOutcome};

/// What happens after feedback is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePolicy {
    /// Inline feedback for every outcome, then move on by itself.
    Auto {
        correct_delay: Duration,
        incorrect_delay: Duration,
    },
    /// Correct answers wait for an explicit continue; incorrect ones move on.
    ConfirmCorrect { incorrect_delay: Duration },
}

impl AdvancePolicy {
    /// Delay before fetching the next hurdle, or `None` to wait for the reader.
    #[must_use]
    pub fn delay_after(&self, feedback: &Feedback) -> Option<Duration> {
        match (*self, feedback.outcome) {
            (AdvancePolicy::Auto { correct_delay, .. }, FeedbackOutcome::Correct) => {
                Some(correct_delay)
            }
            (AdvancePolicy::ConfirmCorrect { .. }, FeedbackOutcome::Correct) => None,
            (
                AdvancePolicy::Auto {
                    incorrect_delay, ..
                }
                | AdvancePolicy::ConfirmCorrect { incorrect_delay },
                _,
            ) => Some(incorrect_delay),
        }
    }

    /// How long a skip note stays up.
    #[must_use]
    pub fn note_delay(&self) -> Duration {
        match *self {
            AdvancePolicy::Auto {
                incorrect_delay, ..
            }
            | AdvancePolicy::ConfirmCorrect { incorrect_delay } => incorrect_delay,
        }
    }
}

impl Default for AdvancePolicy {
    fn default() -> Self {
        Self::Auto {
            correct_delay: Duration::from_secs(2),
            incorrect_delay: Duration::from_secs(5),
        }
    }
}

/// Which endpoint backs the end-of-session summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummarySource {
    #[default]
    Performance,
    CompletionMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub advance: AdvancePolicy,
    /// Period of the visible question timer.
    pub tick: Duration,
    pub summary_source: SummarySource,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            advance: AdvancePolicy::default(),
            tick: Duration::from_secs(1),
            summary_source: SummarySource::default(),
        }
    }
}

impl SessionSettings {
    /// Read `HURDLE_ADVANCE`, `HURDLE_CORRECT_DELAY_MS`, `HURDLE_INCORRECT_DELAY_MS`
    /// and `HURDLE_SUMMARY`. Bad values fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AdvancePolicy::default();
        let AdvancePolicy::Auto {
            correct_delay: default_correct,
            incorrect_delay: default_incorrect,
        } = defaults
        else {
            return Self::default();
        };

        let correct_delay =
            millis(&lookup, "HURDLE_CORRECT_DELAY_MS").unwrap_or(default_correct);
        let incorrect_delay =
            millis(&lookup, "HURDLE_INCORRECT_DELAY_MS").unwrap_or(default_incorrect);

        let advance = match lookup("HURDLE_ADVANCE").as_deref().map(str::trim) {
            None | Some("auto") => AdvancePolicy::Auto {
                correct_delay,
                incorrect_delay,
            },
            Some("confirm") => AdvancePolicy::ConfirmCorrect { incorrect_delay },
            Some(other) => {
                tracing::warn!(value = other, "unknown HURDLE_ADVANCE, using auto");
                AdvancePolicy::Auto {
                    correct_delay,
                    incorrect_delay,
                }
            }
        };

        let summary_source = match lookup("HURDLE_SUMMARY").as_deref().map(str::trim) {
            None | Some("performance") => SummarySource::Performance,
            Some("completion") => SummarySource::CompletionMessage,
            Some(other) => {
                tracing::warn!(value = other, "unknown HURDLE_SUMMARY, using performance");
                SummarySource::Performance
            }
        };

        Self {
            advance,
            tick: Duration::from_secs(1),
            summary_source,
        }
    }

    #[must_use]
    pub fn with_advance(mut self, advance: AdvancePolicy) -> Self {
        self.advance = advance;
        self
    }

    #[must_use]
    pub fn with_summary_source(mut self, summary_source: SummarySource) -> Self {
        self.summary_source = summary_source;
        self
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable delay");
            None
        }
    }
}
