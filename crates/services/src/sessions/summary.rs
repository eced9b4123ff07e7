use hurdle_core::model::PerformanceSummary;

use crate::error::SessionError;
use crate::settings::SummarySource;
use super::machine::{require_session, Flag, SessionMachine};

impl SessionMachine {
    /// Fetch the end-of-session report once the document is finished.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotDone` before completion without contacting the
    /// server, `SessionError::Busy` while a report request is running and
    /// `SessionError::Api` on failure.
    pub async fn request_performance_summary(&self) -> Result<PerformanceSummary, SessionError> {
        let (claim, pdf_id) = self.claim(Flag::Performance, |state| {
            let pdf_id = require_session(state)?;
            if !state.done {
                return Err(SessionError::NotDone);
            }
            state.error = None;
            Ok(pdf_id)
        })?;

        let api = &self.inner.api;
        let result = match self.inner.settings.summary_source {
            SummarySource::Performance => api.performance(&pdf_id).await,
            SummarySource::CompletionMessage => api.completion_message(&pdf_id).await,
        };

        let mut state = self.state();
        if state.generation != claim.generation {
            return Err(SessionError::Superseded);
        }
        let summary = result.map_err(|err| self.record(&mut state, err))?;
        tracing::info!(%pdf_id, has_stats = summary.has_stats(), "performance summary loaded");
        state.performance = Some(summary.clone());
        Ok(summary)
    }
}
