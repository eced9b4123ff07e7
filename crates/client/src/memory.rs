use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use hurdle_core::model::{HurdleFetch, PdfId, PerformanceSummary, QueryAnswer, SubmitOutcome};

use crate::api::{ApiError, HurdleApi, SubmitRequest, UploadReceipt};

/// One request observed by `InMemoryApi`, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Upload { file_name: String, size: usize },
    FetchHurdle(PdfId),
    Submit { pdf_id: PdfId, request: SubmitRequest },
    Query { pdf_id: PdfId, query: String },
    Performance(PdfId),
    CompletionMessage(PdfId),
    Download(PdfId),
}

type Scripted<T> = VecDeque<Result<T, ApiError>>;

#[derive(Default)]
struct Script {
    uploads: Scripted<UploadReceipt>,
    hurdles: Scripted<HurdleFetch>,
    submissions: Scripted<SubmitOutcome>,
    queries: Scripted<QueryAnswer>,
    reports: Scripted<PerformanceSummary>,
    downloads: Scripted<Vec<u8>>,
    calls: Vec<ApiCall>,
}

/// Scripted backend for tests and offline demos.
///
/// Each operation pops the next queued result; an empty queue behaves like an
/// unreachable server. Every call is recorded before the optional latency so
/// in-flight requests are visible to assertions.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    script: Arc<Mutex<Script>>,
    latency: Option<Duration>,
}

impl InMemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency` (pairs well with a paused tokio clock).
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn push_upload(&self, result: Result<UploadReceipt, ApiError>) {
        self.script().uploads.push_back(result);
    }

    pub fn push_hurdle(&self, result: Result<HurdleFetch, ApiError>) {
        self.script().hurdles.push_back(result);
    }

    pub fn push_submission(&self, result: Result<SubmitOutcome, ApiError>) {
        self.script().submissions.push_back(result);
    }

    pub fn push_query(&self, result: Result<QueryAnswer, ApiError>) {
        self.script().queries.push_back(result);
    }

    /// Queue a report for either performance endpoint.
    pub fn push_report(&self, result: Result<PerformanceSummary, ApiError>) {
        self.script().reports.push_back(result);
    }

    pub fn push_download(&self, result: Result<Vec<u8>, ApiError>) {
        self.script().downloads.push_back(result);
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.script().calls.clone()
    }

    /// Number of hurdle fetches received so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|call| matches!(call, ApiCall::FetchHurdle(_)))
            .count()
    }

    /// Requests sent to the submit endpoint, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.script()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::Submit { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    async fn respond<T>(
        &self,
        call: ApiCall,
        queue: fn(&mut Script) -> &mut Scripted<T>,
    ) -> Result<T, ApiError> {
        let operation = format!("{call:?}");
        self.script().calls.push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        queue(&mut self.script())
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Unavailable(format!("nothing scripted for {operation}"))))
    }
}

#[async_trait]
impl HurdleApi for InMemoryApi {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        let call = ApiCall::Upload {
            file_name: file_name.to_owned(),
            size: bytes.len(),
        };
        self.respond(call, |s| &mut s.uploads).await
    }

    async fn fetch_hurdle(&self, pdf_id: &PdfId) -> Result<HurdleFetch, ApiError> {
        self.respond(ApiCall::FetchHurdle(pdf_id.clone()), |s| &mut s.hurdles)
            .await
    }

    async fn submit(
        &self,
        pdf_id: &PdfId,
        request: &SubmitRequest,
    ) -> Result<SubmitOutcome, ApiError> {
        let call = ApiCall::Submit {
            pdf_id: pdf_id.clone(),
            request: request.clone(),
        };
        self.respond(call, |s| &mut s.submissions).await
    }

    async fn query(&self, pdf_id: &PdfId, query: &str) -> Result<QueryAnswer, ApiError> {
        let call = ApiCall::Query {
            pdf_id: pdf_id.clone(),
            query: query.trim().to_owned(),
        };
        self.respond(call, |s| &mut s.queries).await
    }

    async fn performance(&self, pdf_id: &PdfId) -> Result<PerformanceSummary, ApiError> {
        self.respond(ApiCall::Performance(pdf_id.clone()), |s| &mut s.reports)
            .await
    }

    async fn completion_message(&self, pdf_id: &PdfId) -> Result<PerformanceSummary, ApiError> {
        let call = ApiCall::CompletionMessage(pdf_id.clone());
        self.respond(call, |s| &mut s.reports).await
    }

    async fn download(&self, pdf_id: &PdfId) -> Result<Vec<u8>, ApiError> {
        self.respond(ApiCall::Download(pdf_id.clone()), |s| &mut s.downloads)
            .await
    }
}
