use std::sync::Arc;
use std::time::Duration;

use super::machine::SessionMachine;
use super::state::SessionState;

/// Deferred step queued after feedback is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Clear the feedback and fetch the next hurdle.
    AdvanceToNext,
    /// Clear the feedback only.
    ClearFeedback,
}

impl SessionMachine {
    /// Queue `transition` to run after `delay`, replacing any queued one.
    ///
    /// The task holds only a weak handle, and it does nothing if the session
    /// was restarted or another transition was queued in the meantime.
    pub(crate) fn schedule(&self, state: &mut SessionState, transition: Transition, delay: Duration) {
        self.cancel_scheduled(state);
        let generation = state.generation;
        let token = state.transition_token;
        let inner = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let machine = SessionMachine { inner };
            machine.run_scheduled(transition, generation, token).await;
        });
        self.set_scheduled(handle);
        tracing::trace!(?transition, ?delay, "transition scheduled");
    }

    async fn run_scheduled(&self, transition: Transition, generation: u64, token: u64) {
        {
            let mut state = self.state();
            if state.generation != generation || state.transition_token != token {
                return;
            }
            self.detach_scheduled();
            state.feedback = None;
        }

        if transition == Transition::AdvanceToNext {
            if let Err(err) = self.fetch_next_hurdle().await {
                tracing::debug!(error = %err, "auto-advance did not complete");
            }
        }
    }
}
