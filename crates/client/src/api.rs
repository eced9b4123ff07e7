use std::path::Path;

use async_trait::async_trait;
use hurdle_core::ModelError;
use hurdle_core::model::{
    Answer, HurdleFetch, PdfId, PerformanceSummary, QueryAnswer, SubmitOutcome, TaskType,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by API adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body carried an `error` field despite a successful status.
    #[error("{0}")]
    Application(String),

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Returned by the upload endpoint once the document has been chunked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub pdf_id: PdfId,
    pub num_chunks: u32,
    pub title: Option<String>,
}

/// Body of `POST /api/hurdle/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    pub task_type: TaskType,
    pub time_ms: u64,
    pub skip: bool,
}

impl SubmitRequest {
    #[must_use]
    pub fn answer(task_type: TaskType, answer: Answer, time_ms: u64) -> Self {
        Self {
            answer: Some(answer),
            task_type,
            time_ms,
            skip: false,
        }
    }

    #[must_use]
    pub fn skip(task_type: TaskType, time_ms: u64) -> Self {
        Self {
            answer: None,
            task_type,
            time_ms,
            skip: true,
        }
    }
}

/// Contract of the backend that chunks documents and serves hurdles.
#[async_trait]
pub trait HurdleApi: Send + Sync {
    /// Upload a PDF for chunking.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or when the server rejects the file.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError>;

    /// Fetch the next hurdle, or the completion marker.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, application or decoding failures.
    async fn fetch_hurdle(&self, pdf_id: &PdfId) -> Result<HurdleFetch, ApiError>;

    /// Submit an answer (or a skip) for the current hurdle.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, application or decoding failures.
    async fn submit(
        &self,
        pdf_id: &PdfId,
        request: &SubmitRequest,
    ) -> Result<SubmitOutcome, ApiError>;

    /// Ask a free-text question about the document.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, application or decoding failures.
    async fn query(&self, pdf_id: &PdfId, query: &str) -> Result<QueryAnswer, ApiError>;

    /// Structured end-of-session statistics.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, application or decoding failures.
    async fn performance(&self, pdf_id: &PdfId) -> Result<PerformanceSummary, ApiError>;

    /// Narrative end-of-session message, possibly with stats.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, application or decoding failures.
    async fn completion_message(&self, pdf_id: &PdfId) -> Result<PerformanceSummary, ApiError>;

    /// Original document bytes, passed through untouched.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    async fn download(&self, pdf_id: &PdfId) -> Result<Vec<u8>, ApiError>;
}

/// A local file ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Read a document from disk for upload.
///
/// # Errors
///
/// Returns `ApiError::Io` if the file cannot be read.
pub async fn load_document(path: &Path) -> Result<Document, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "document.pdf".to_owned(), |name| name.to_string_lossy().into_owned());
    Ok(Document { file_name, bytes })
}
