use serde::Deserialize;

/// Per-topic line of a structured performance report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicStats {
    pub topic: String,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub avg_time: f64,
    #[serde(default)]
    pub questions_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct CompletionStats {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub wrong: u32,
    #[serde(default)]
    pub skipped: u32,
    pub average_time: Option<f64>,
}

/// Everything the performance endpoints have been seen to return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PerformancePayload {
    /// A bare natural-language message.
    Message(String),
    /// An object with structured stats, a message, or both.
    Report(PerformanceReport),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PerformanceReport {
    pub message: Option<String>,
    pub stats: Option<CompletionStats>,
    pub total_questions: Option<u32>,
    pub correct_answers: Option<u32>,
    pub accuracy: Option<f64>,
    pub average_time: Option<f64>,
    #[serde(default)]
    pub topics: Vec<TopicStats>,
}

/// End-of-session report normalized from any `PerformancePayload`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceSummary {
    pub total_questions: Option<u32>,
    pub correct: Option<u32>,
    pub wrong: Option<u32>,
    pub skipped: Option<u32>,
    /// Ratio in `[0, 1]`.
    pub accuracy: Option<f64>,
    /// Seconds, as reported by the server.
    pub average_time: Option<f64>,
    pub topics: Vec<TopicStats>,
    pub message: Option<String>,
}

impl PerformanceSummary {
    #[must_use]
    pub fn has_stats(&self) -> bool {
        self.total_questions.is_some() || self.accuracy.is_some() || !self.topics.is_empty()
    }
}

impl From<PerformancePayload> for PerformanceSummary {
    fn from(payload: PerformancePayload) -> Self {
        match payload {
            PerformancePayload::Message(message) => Self {
                message: non_blank(message),
                ..Self::default()
            },
            PerformancePayload::Report(report) => Self::from(report),
        }
    }
}

impl From<PerformanceReport> for PerformanceSummary {
    fn from(report: PerformanceReport) -> Self {
        let stats = report.stats;
        let total_questions = report
            .total_questions
            .or_else(|| stats.map(|s| s.correct + s.wrong + s.skipped));
        let correct = report.correct_answers.or(stats.map(|s| s.correct));
        let accuracy = report
            .accuracy
            .map(normalize_ratio)
            .or_else(|| derived_accuracy(correct, total_questions));

        Self {
            total_questions,
            correct,
            wrong: stats.map(|s| s.wrong),
            skipped: stats.map(|s| s.skipped),
            accuracy,
            average_time: report.average_time.or(stats.and_then(|s| s.average_time)),
            topics: report.topics,
            message: report.message.and_then(non_blank),
        }
    }
}

// Some reports send 87.5 instead of 0.875.
fn normalize_ratio(value: f64) -> f64 {
    let ratio = if value > 1.0 { value / 100.0 } else { value };
    ratio.clamp(0.0, 1.0)
}

fn derived_accuracy(correct: Option<u32>, total: Option<u32>) -> Option<f64> {
    let total = total?;
    if total == 0 {
        return Some(0.0);
    }
    Some(f64::from(correct.unwrap_or(0)) / f64::from(total))
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
