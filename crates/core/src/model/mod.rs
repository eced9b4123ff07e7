mod answer;
mod feedback;
mod hurdle;
mod ids;
mod performance;
mod progress;
mod query;
pub mod task;

pub use answer::Answer;
pub use feedback::{Feedback, FeedbackOutcome, SubmitOutcome};
pub use hurdle::{Hurdle, HurdleFetch, QuestionProgress};
pub use ids::PdfId;
pub use performance::{
    CompletionStats, PerformancePayload, PerformanceReport, PerformanceSummary, TopicStats,
};
pub use progress::{Progress, ProgressUpdate};
pub use query::{Confidence, QueryAnswer};
pub use task::{
    BossQuestion, BossTask, ChoiceTask, ClozeTask, Concept, HighlightTask, MatchingTask, Task,
    TaskType, TypingTask,
};
