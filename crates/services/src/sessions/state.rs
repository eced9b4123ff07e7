use std::sync::{Mutex, MutexGuard, PoisonError};

use hurdle_core::model::{Feedback, Hurdle, PdfId, PerformanceSummary, Progress};
use tokio::time::Instant;

/// Coarse position of the session, derived from the stored fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoSession,
    /// A document is active but no hurdle is on screen yet.
    AwaitingHurdle,
    Question,
    Done,
}

/// Visible per-question stopwatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerReading {
    pub seconds: u32,
    pub running: bool,
}

/// Free-form question about the document, independent of the hurdle flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub query: String,
    pub response: String,
    pub loading: bool,
}

/// Everything a view needs to render the reading session.
///
/// Owned by `SessionMachine`; callers read it through `snapshot()`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub(crate) pdf_id: Option<PdfId>,
    pub(crate) num_chunks: u32,
    pub(crate) hurdle: Option<Hurdle>,
    pub(crate) progress: Progress,
    pub(crate) done: bool,
    pub(crate) timer: TimerReading,
    pub(crate) started: Option<Instant>,
    pub(crate) feedback: Option<Feedback>,
    // Set once the server has consumed the hurdle on screen.
    pub(crate) answered: bool,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) performance: Option<PerformanceSummary>,
    pub(crate) performance_loading: bool,
    pub(crate) query: QueryState,
    // Bumped by start and restart; results tagged with an older value are dropped.
    pub(crate) generation: u64,
    pub(crate) timer_token: u64,
    pub(crate) transition_token: u64,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.pdf_id, &self.hurdle, self.done) {
            (None, _, _) => SessionPhase::NoSession,
            (Some(_), _, true) => SessionPhase::Done,
            (Some(_), Some(_), false) => SessionPhase::Question,
            (Some(_), None, false) => SessionPhase::AwaitingHurdle,
        }
    }

    #[must_use]
    pub fn pdf_id(&self) -> Option<&PdfId> {
        self.pdf_id.as_ref()
    }

    #[must_use]
    pub fn num_chunks(&self) -> u32 {
        self.num_chunks
    }

    #[must_use]
    pub fn hurdle(&self) -> Option<&Hurdle> {
        self.hurdle.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn timer(&self) -> TimerReading {
        self.timer
    }

    /// True after a correct answer or a skip until the next hurdle arrives.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn performance(&self) -> Option<&PerformanceSummary> {
        self.performance.as_ref()
    }

    #[must_use]
    pub fn is_performance_loading(&self) -> bool {
        self.performance_loading
    }

    #[must_use]
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Milliseconds spent on the current question so far, 0 when no timer ran.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.started.map_or(0, |started| {
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
        })
    }

    /// Share of chunks completed, for progress bars.
    #[must_use]
    pub fn progress_ratio(&self) -> f64 {
        self.progress.ratio(self.num_chunks)
    }

    /// Back to the initial state. Tokens keep counting so stale work stays stale.
    pub(crate) fn reset(&mut self) {
        *self = Self {
            generation: self.generation.wrapping_add(1),
            timer_token: self.timer_token,
            transition_token: self.transition_token,
            ..Self::default()
        };
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
