//! Plain-text views of session state for the terminal.

use std::fmt;

use hurdle_core::model::{Feedback, FeedbackOutcome, Hurdle, PerformanceSummary, Task};
use services::SessionState;

pub const HELP: &str = "\
Answer formats:
  choice     option number, e.g. 2
  cloze      the missing word
  matching   term=definition pairs separated by ';' (a definition may be its number)
  typing     the text as shown
  highlight  phrases separated by ';'
  boss       one option number per question, e.g. 1,3,2
Commands: skip, ?<question about the document>, help, quit";

fn percent(value: f64) -> f64 {
    if value <= 1.0 { value * 100.0 } else { value }
}

/// A hurdle as shown at the prompt: chunk text, then the task.
pub struct HurdleView<'a>(pub &'a Hurdle);

impl fmt::Display for HurdleView<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hurdle = self.0;
        if let Some(title) = &hurdle.document_title {
            writeln!(out, "[{title}]")?;
        }
        if let Some(progress) = &hurdle.question_progress {
            writeln!(
                out,
                "Question {}/{} (chunk {}/{})",
                progress.current_question,
                progress.total_questions,
                progress.chunk_number,
                progress.total_chunks
            )?;
        }
        if !hurdle.chunk.is_empty() {
            writeln!(out, "\n{}\n", hurdle.chunk.trim())?;
        }

        match &hurdle.task {
            Task::Choice(task) => {
                writeln!(out, "{}", task.question)?;
                for (number, option) in task.options.iter().enumerate() {
                    writeln!(out, "  {}. {option}", number + 1)?;
                }
                if let Some(hint) = &task.hint {
                    writeln!(out, "Hint: {hint}")?;
                }
            }
            Task::Cloze(task) => {
                writeln!(out, "Fill in the blank: {}", task.question)?;
                if let Some(hint) = &task.hint {
                    writeln!(out, "Hint: {hint}")?;
                }
            }
            Task::Matching(task) => {
                writeln!(out, "Match each term to its definition.")?;
                for concept in &task.concepts {
                    writeln!(out, "  - {}", concept.term)?;
                }
                for (number, definition) in task.definitions.iter().enumerate() {
                    writeln!(out, "  {}. {definition}", number + 1)?;
                }
            }
            Task::Typing(task) => {
                writeln!(out, "Type exactly:\n  {}", task.typing_text)?;
            }
            Task::Highlight(task) => {
                writeln!(out, "Pick out the key phrases:\n  {}", task.text)?;
            }
            Task::Boss(task) => {
                let difficulty = task.difficulty.or(hurdle.difficulty);
                match difficulty {
                    Some(level) => writeln!(out, "*** {} (difficulty {level}) ***", task.title)?,
                    None => writeln!(out, "*** {} ***", task.title)?,
                }
                for (index, question) in task.questions.iter().enumerate() {
                    writeln!(out, "{}) {}", index + 1, question.question)?;
                    for (number, option) in question.options.iter().enumerate() {
                        writeln!(out, "    {}. {option}", number + 1)?;
                    }
                }
            }
        }
        Ok(())
    }
}

pub struct FeedbackView<'a>(pub &'a Feedback);

impl fmt::Display for FeedbackView<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let feedback = self.0;
        match feedback.outcome {
            FeedbackOutcome::Correct => match feedback.points_earned {
                Some(points) => writeln!(out, "Correct! +{points} XP")?,
                None => writeln!(out, "Correct!")?,
            },
            FeedbackOutcome::Incorrect if feedback.score > 0.0 => {
                writeln!(out, "Partly right ({:.0}%).", feedback.score)?;
            }
            FeedbackOutcome::Incorrect => writeln!(out, "Not quite.")?,
            FeedbackOutcome::Skipped => {}
        }
        if !feedback.explanation.is_empty() {
            writeln!(out, "{}", feedback.explanation)?;
        }
        if let Some(hint) = &feedback.hint {
            writeln!(out, "Hint: {hint}")?;
        }
        if let Some(message) = &feedback.message {
            writeln!(out, "{message}")?;
        }
        Ok(())
    }
}

/// One-line progress bar: chunk, XP, streak and the question timer.
#[must_use]
pub fn status(state: &SessionState) -> String {
    let progress = state.progress();
    format!(
        "chunk {}/{} ({:.0}%) | {} XP | streak {} | {}s",
        progress.current(),
        state.num_chunks(),
        state.progress_ratio() * 100.0,
        progress.xp(),
        progress.streak(),
        state.timer().seconds
    )
}

pub struct SummaryView<'a>(pub &'a PerformanceSummary);

impl fmt::Display for SummaryView<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(out, "=== Session complete ===")?;
        if let Some(message) = &summary.message {
            writeln!(out, "{message}")?;
        }
        if let Some(total) = summary.total_questions {
            writeln!(out, "Questions: {total}")?;
        }
        let tally = [
            ("Correct", summary.correct),
            ("Wrong", summary.wrong),
            ("Skipped", summary.skipped),
        ];
        for (label, count) in tally {
            if let Some(count) = count {
                writeln!(out, "{label}: {count}")?;
            }
        }
        if let Some(accuracy) = summary.accuracy {
            writeln!(out, "Accuracy: {:.0}%", percent(accuracy))?;
        }
        if let Some(average) = summary.average_time {
            writeln!(out, "Average time: {average:.1}s")?;
        }
        if !summary.topics.is_empty() {
            writeln!(out, "By topic:")?;
            for topic in &summary.topics {
                writeln!(
                    out,
                    "  {}: {:.0}% over {} question(s), {:.1}s avg",
                    topic.topic,
                    percent(topic.accuracy),
                    topic.questions_count,
                    topic.avg_time
                )?;
            }
        }
        Ok(())
    }
}
