use crate::error::SessionError;
use super::machine::{require_session, Flag, SessionMachine};

impl SessionMachine {
    /// Ask a free-form question about the document.
    ///
    /// Runs alongside the hurdle flow; only a second query is refused while one
    /// is pending. Returns the rendered response, which is also stored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuery` for blank input, `SessionError::Busy`
    /// while another query runs and `SessionError::Api` on failure.
    pub async fn ask(&self, query: &str) -> Result<String, SessionError> {
        let query = query.trim();
        let (claim, pdf_id) = self.claim(Flag::Query, |state| {
            let pdf_id = require_session(state)?;
            if query.is_empty() {
                return Err(SessionError::EmptyQuery);
            }
            query.clone_into(&mut state.query.query);
            state.query.response.clear();
            Ok(pdf_id)
        })?;

        let result = self.inner.api.query(&pdf_id, query).await;

        let mut state = self.state();
        if state.generation != claim.generation {
            return Err(SessionError::Superseded);
        }
        let answer = result.map_err(|err| self.record(&mut state, err))?;
        let response = answer.render();
        tracing::debug!(%pdf_id, confidence = ?answer.confidence, "query answered");
        response.clone_into(&mut state.query.response);
        Ok(response)
    }
}
