#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod http;
pub mod memory;

pub use api::{ApiError, Document, HurdleApi, SubmitRequest, UploadReceipt, load_document};
pub use config::{ApiConfig, ConfigError};
pub use http::HttpApi;
pub use memory::{ApiCall, InMemoryApi};
