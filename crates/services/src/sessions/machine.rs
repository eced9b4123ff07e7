use std::sync::{Arc, Mutex, MutexGuard};

use client::{ApiError, HurdleApi, SubmitRequest, UploadReceipt};
use hurdle_core::model::{Answer, Feedback, HurdleFetch, PdfId};
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::settings::SessionSettings;
use super::schedule::Transition;
use super::state::{lock, SessionPhase, SessionState};
use super::timer::QuestionTimer;

/// Loading flag owned by one in-flight operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flag {
    Loading,
    Performance,
    Query,
}

impl Flag {
    fn slot(self, state: &mut SessionState) -> &mut bool {
        match self {
            Flag::Loading => &mut state.loading,
            Flag::Performance => &mut state.performance_loading,
            Flag::Query => &mut state.query.loading,
        }
    }
}

/// Holds a loading flag for the lifetime of one request.
///
/// Dropping clears the flag unless the session was restarted in between.
pub(crate) struct Claim<'a> {
    state: &'a Mutex<SessionState>,
    flag: Flag,
    pub(crate) generation: u64,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.generation == self.generation {
            *self.flag.slot(&mut state) = false;
        }
    }
}

pub(crate) struct Inner {
    pub(crate) api: Arc<dyn HurdleApi>,
    pub(crate) settings: SessionSettings,
    state: Arc<Mutex<SessionState>>,
    timer: Mutex<QuestionTimer>,
    scheduled: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.scheduled).take() {
            handle.abort();
        }
    }
}

/// Drives one reading session against a `HurdleApi`.
///
/// Cheap to clone; clones share the same session. All state lives behind a
/// mutex that is never held across an await, so a restart always wins over
/// requests still in flight.
#[derive(Clone)]
pub struct SessionMachine {
    pub(crate) inner: Arc<Inner>,
}

impl SessionMachine {
    #[must_use]
    pub fn new(api: Arc<dyn HurdleApi>, settings: SessionSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                settings,
                state: Arc::new(Mutex::new(SessionState::default())),
                timer: Mutex::new(QuestionTimer::new(settings.tick)),
                scheduled: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    /// Copy of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state().phase()
    }

    /// Upload a document, then start a session on it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` while another hurdle request is running and
    /// `SessionError::Api` when the upload or the first fetch fails.
    pub async fn upload_and_start(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, SessionError> {
        let (claim, ()) = self.claim(Flag::Loading, |state| {
            state.error = None;
            Ok(())
        })?;

        let result = self.inner.api.upload(file_name, bytes).await;
        let receipt = {
            let mut state = self.state();
            if state.generation != claim.generation {
                return Err(SessionError::Superseded);
            }
            result.map_err(|err| self.record(&mut state, err))?
        };
        drop(claim);

        tracing::info!(
            pdf_id = %receipt.pdf_id,
            num_chunks = receipt.num_chunks,
            "document uploaded"
        );
        self.start_session(receipt.pdf_id.clone(), receipt.num_chunks)
            .await?;
        Ok(receipt)
    }

    /// Begin a fresh session on an already uploaded document.
    ///
    /// Anything left from a previous session is discarded first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` when the first hurdle cannot be fetched. The
    /// session stays active so the fetch can be retried.
    pub async fn start_session(
        &self,
        pdf_id: PdfId,
        num_chunks: u32,
    ) -> Result<SessionPhase, SessionError> {
        {
            let mut state = self.state();
            self.teardown(&mut state);
            state.reset();
            state.pdf_id = Some(pdf_id.clone());
            state.num_chunks = num_chunks;
        }
        tracing::info!(%pdf_id, num_chunks, "session started");
        self.fetch_next_hurdle().await
    }

    /// Ask the server for the next hurdle, or learn that the document is done.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSession` before a session starts,
    /// `SessionError::AlreadyDone` once complete, `SessionError::Busy` while
    /// another hurdle request runs and `SessionError::Api` on failure. A failed
    /// fetch leaves the current hurdle and progress untouched.
    pub async fn fetch_next_hurdle(&self) -> Result<SessionPhase, SessionError> {
        let (claim, pdf_id) = self.claim(Flag::Loading, |state| {
            let pdf_id = require_session(state)?;
            if state.done {
                return Err(SessionError::AlreadyDone);
            }
            state.error = None;
            Ok(pdf_id)
        })?;
        self.load_hurdle(&claim, &pdf_id).await
    }

    pub(crate) async fn load_hurdle(
        &self,
        claim: &Claim<'_>,
        pdf_id: &PdfId,
    ) -> Result<SessionPhase, SessionError> {
        let result = self.inner.api.fetch_hurdle(pdf_id).await;

        let mut state = self.state();
        if state.generation != claim.generation {
            return Err(SessionError::Superseded);
        }
        match result {
            Ok(HurdleFetch::Done) => {
                state.hurdle = None;
                state.done = true;
                self.timer().stop(&mut state);
                tracing::info!(%pdf_id, "document completed");
            }
            Ok(HurdleFetch::Next(hurdle)) => {
                tracing::debug!(
                    %pdf_id,
                    idx = hurdle.idx,
                    task_type = %hurdle.task_type(),
                    is_boss = hurdle.is_boss,
                    "hurdle loaded"
                );
                state.hurdle = Some(*hurdle);
                state.answered = false;
                self.timer().start(&self.inner.state, &mut state);
            }
            Err(err) => return Err(self.record(&mut state, err)),
        }
        Ok(state.phase())
    }

    /// Submit an answer for the hurdle on screen.
    ///
    /// Progress and feedback come from the server response. What happens next
    /// is decided by the configured `AdvancePolicy`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AnswerMismatch` when the answer shape does not fit
    /// the task, `SessionError::AlreadyAnswered` once the hurdle was answered
    /// correctly or skipped, `SessionError::Busy` while another request runs and
    /// `SessionError::Api` when the server rejects the submission.
    pub async fn submit_answer(&self, answer: Answer) -> Result<Feedback, SessionError> {
        let (claim, (pdf_id, request)) = self.claim(Flag::Loading, |state| {
            let pdf_id = require_session(state)?;
            if state.done {
                return Err(SessionError::AlreadyDone);
            }
            let task_type = state
                .hurdle
                .as_ref()
                .map(|hurdle| hurdle.task_type())
                .ok_or(SessionError::NoHurdle)?;
            if state.answered {
                return Err(SessionError::AlreadyAnswered);
            }
            if !answer.fits(task_type) {
                return Err(SessionError::AnswerMismatch {
                    expected: task_type,
                    got: answer.kind(),
                });
            }
            self.cancel_scheduled(state);
            state.error = None;
            let request = SubmitRequest::answer(task_type, answer, state.elapsed_ms());
            Ok((pdf_id, request))
        })?;

        let result = self.inner.api.submit(&pdf_id, &request).await;

        let mut state = self.state();
        if state.generation != claim.generation {
            return Err(SessionError::Superseded);
        }
        let outcome = result.map_err(|err| self.record(&mut state, err))?;

        let total = state.num_chunks;
        state.progress.apply(outcome.progress_update(), total);
        let feedback = Feedback::from_submission(&outcome);
        state.answered = feedback.is_correct();
        state.feedback = Some(feedback.clone());
        self.timer().stop(&mut state);
        tracing::debug!(
            %pdf_id,
            correct = outcome.correct,
            time_ms = request.time_ms,
            current = state.progress.current(),
            "answer submitted"
        );

        if let Some(delay) = self.inner.settings.advance.delay_after(&feedback) {
            self.schedule(&mut state, Transition::AdvanceToNext, delay);
        }
        Ok(feedback)
    }

    /// Skip the current hurdle. Always moves on to the next one.
    ///
    /// # Errors
    ///
    /// Same as `submit_answer`, plus any failure of the follow-up fetch.
    pub async fn skip(&self) -> Result<SessionPhase, SessionError> {
        let (claim, (pdf_id, request)) = self.claim(Flag::Loading, |state| {
            let pdf_id = require_session(state)?;
            if state.done {
                return Err(SessionError::AlreadyDone);
            }
            let task_type = state
                .hurdle
                .as_ref()
                .map(|hurdle| hurdle.task_type())
                .ok_or(SessionError::NoHurdle)?;
            if state.answered {
                return Err(SessionError::AlreadyAnswered);
            }
            self.cancel_scheduled(state);
            state.error = None;
            Ok((pdf_id, SubmitRequest::skip(task_type, state.elapsed_ms())))
        })?;

        let result = self.inner.api.submit(&pdf_id, &request).await;
        {
            let mut state = self.state();
            if state.generation != claim.generation {
                return Err(SessionError::Superseded);
            }
            let outcome = result.map_err(|err| self.record(&mut state, err))?;
            let total = state.num_chunks;
            state.progress.apply(outcome.progress_update(), total);
            state.feedback = Some(Feedback::skipped(&outcome));
            state.answered = true;
            self.timer().stop(&mut state);
            tracing::debug!(%pdf_id, "hurdle skipped");
        }

        let phase = self.load_hurdle(&claim, &pdf_id).await?;

        let mut state = self.state();
        if state.generation == claim.generation && state.feedback.is_some() {
            let delay = self.inner.settings.advance.note_delay();
            self.schedule(&mut state, Transition::ClearFeedback, delay);
        }
        Ok(phase)
    }

    /// Leave the feedback view and fetch the next hurdle now.
    ///
    /// # Errors
    ///
    /// Same as `fetch_next_hurdle`.
    pub async fn continue_to_next(&self) -> Result<SessionPhase, SessionError> {
        {
            let mut state = self.state();
            require_session(&state)?;
            if state.loading {
                return Err(SessionError::Busy);
            }
            self.cancel_scheduled(&mut state);
            state.feedback = None;
        }
        self.fetch_next_hurdle().await
    }

    /// Drop the session and everything attached to it. No network call.
    pub fn restart(&self) {
        let mut state = self.state();
        self.teardown(&mut state);
        state.reset();
        tracing::info!("session reset");
    }

    pub fn dismiss_error(&self) {
        self.state().error = None;
    }

    pub fn dismiss_feedback(&self) {
        self.state().feedback = None;
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.inner.state)
    }

    fn timer(&self) -> MutexGuard<'_, QuestionTimer> {
        lock(&self.inner.timer)
    }

    /// Take `flag` for one request after `check` passes, all under one lock.
    pub(crate) fn claim<T>(
        &self,
        flag: Flag,
        check: impl FnOnce(&mut SessionState) -> Result<T, SessionError>,
    ) -> Result<(Claim<'_>, T), SessionError> {
        let mut state = self.state();
        if *flag.slot(&mut state) {
            return Err(SessionError::Busy);
        }
        let value = check(&mut *state)?;
        *flag.slot(&mut state) = true;
        let claim = Claim {
            state: self.inner.state.as_ref(),
            flag,
            generation: state.generation,
        };
        Ok((claim, value))
    }

    /// Put a failed request into the error slot and hand the error back.
    pub(crate) fn record(&self, state: &mut SessionState, err: ApiError) -> SessionError {
        let err = SessionError::from(err);
        tracing::warn!(error = %err, "session request failed");
        state.error = Some(err.to_string());
        err
    }

    fn teardown(&self, state: &mut SessionState) {
        self.timer().stop(state);
        self.cancel_scheduled(state);
    }

    pub(crate) fn cancel_scheduled(&self, state: &mut SessionState) {
        state.transition_token = state.transition_token.wrapping_add(1);
        if let Some(handle) = lock(&self.inner.scheduled).take() {
            handle.abort();
        }
    }

    pub(crate) fn set_scheduled(&self, handle: JoinHandle<()>) {
        *lock(&self.inner.scheduled) = Some(handle);
    }

    /// Forget the handle of the transition that is now running.
    pub(crate) fn detach_scheduled(&self) {
        lock(&self.inner.scheduled).take();
    }
}

pub(crate) fn require_session(state: &SessionState) -> Result<PdfId, SessionError> {
    state.pdf_id.clone().ok_or(SessionError::NoSession)
}
