//! reqwest adapter for the hurdle backend.

use async_trait::async_trait;
use hurdle_core::model::{
    HurdleFetch, PdfId, PerformancePayload, PerformanceSummary, QueryAnswer, SubmitOutcome,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::api::{ApiError, HurdleApi, SubmitRequest, UploadReceipt};
use crate::config::ApiConfig;

#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Build a client honoring the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the TLS backend cannot be initialized.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url().clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Malformed(format!("unusable base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        read_json(&url, response).await
    }

    async fn post_json<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<Value, ApiError> {
        tracing::debug!(%url, "POST");
        let response = self.client.post(url.clone()).json(body).send().await?;
        read_json(&url, response).await
    }
}

async fn read_json(url: &Url, response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;
    let value: Option<Value> = serde_json::from_slice(&body).ok();
    let error = value
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    if !status.is_success() {
        let message = error.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        });
        tracing::warn!(%url, status = status.as_u16(), %message, "request failed");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    if let Some(message) = error {
        tracing::warn!(%url, %message, "server reported an error");
        return Err(ApiError::Application(message));
    }

    value.ok_or_else(|| ApiError::Malformed(format!("{url} did not return JSON")))
}

fn decode<T: DeserializeOwned>(value: Value, kind: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Malformed(format!("{kind}: {err}")))
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

#[async_trait]
impl HurdleApi for HttpApi {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        let url = self.endpoint(&["api", "upload"])?;
        tracing::debug!(%url, file_name, size = bytes.len(), "uploading document");
        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);
        let response = self.client.post(url.clone()).multipart(form).send().await?;
        let value = read_json(&url, response).await?;
        decode(value, "upload receipt")
    }

    async fn fetch_hurdle(&self, pdf_id: &PdfId) -> Result<HurdleFetch, ApiError> {
        let url = self.endpoint(&["api", "hurdle", pdf_id.as_str()])?;
        let value = self.get_json(url).await?;
        Ok(HurdleFetch::from_value(value)?)
    }

    async fn submit(
        &self,
        pdf_id: &PdfId,
        request: &SubmitRequest,
    ) -> Result<SubmitOutcome, ApiError> {
        let url = self.endpoint(&["api", "hurdle", pdf_id.as_str()])?;
        let value = self.post_json(url, request).await?;
        decode(value, "submit response")
    }

    async fn query(&self, pdf_id: &PdfId, query: &str) -> Result<QueryAnswer, ApiError> {
        let url = self.endpoint(&["api", "query", pdf_id.as_str()])?;
        let body = QueryBody {
            query: query.trim(),
        };
        let value = self.post_json(url, &body).await?;
        decode(value, "query answer")
    }

    async fn performance(&self, pdf_id: &PdfId) -> Result<PerformanceSummary, ApiError> {
        let url = self.endpoint(&["api", "performance", pdf_id.as_str()])?;
        let value = self.get_json(url).await?;
        let payload: PerformancePayload = decode(value, "performance report")?;
        Ok(payload.into())
    }

    async fn completion_message(&self, pdf_id: &PdfId) -> Result<PerformanceSummary, ApiError> {
        let url = self.endpoint(&["api", "completion-message", pdf_id.as_str()])?;
        let value = self.get_json(url).await?;
        let payload: PerformancePayload = decode(value, "completion message")?;
        Ok(payload.into())
    }

    async fn download(&self, pdf_id: &PdfId) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&["api", "download", pdf_id.as_str()])?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            // Failures come back as JSON even though success is binary.
            return Err(read_json(&url, response)
                .await
                .err()
                .unwrap_or(ApiError::Status {
                    status: status.as_u16(),
                    message: "download failed".to_owned(),
                }));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
