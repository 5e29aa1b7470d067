//! HTTP client for the BowlersNetwork backend.
//!
//! Provides a bearer-authenticated client with JSON POST helpers, domain
//! methods for the upload endpoints, the streaming presigned PUT, and the
//! `DirectUpload` workflow tying them together. The CLI uses this crate directly.

pub mod api;
pub mod retry;
pub mod title_check;
pub mod transfer;
pub mod workflow;

use bowlers_core::{ClientConfig, UploadError};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

pub use retry::RetryPolicy;
pub use title_check::TitleChecker;
pub use workflow::{CommitTarget, DirectUpload, UploadOutcome};

/// Connect timeout for the storage PUT. The transfer itself is unbounded.
const STORAGE_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure of a single backend call, before it is mapped to an upload stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Not signed in or session expired")]
    Unauthenticated,

    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to send request: {0}")]
    Network(String),

    #[error("Failed to parse response as JSON: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Network(_) => true,
            BackendError::Status { status, .. } => bowlers_core::error::is_retryable_status(*status),
            BackendError::Unauthenticated | BackendError::Decode(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn into_initiation_error(self) -> UploadError {
        match self {
            BackendError::Unauthenticated => UploadError::Unauthenticated,
            other => UploadError::Initiation {
                status: other.status(),
                message: other.message(),
            },
        }
    }

    pub fn into_commit_error(self, orphan_cleaned: bool) -> UploadError {
        match self {
            BackendError::Unauthenticated => UploadError::Unauthenticated,
            other => UploadError::Commit {
                status: other.status(),
                message: other.message(),
                orphan_cleaned,
            },
        }
    }

    pub fn into_title_check_error(self) -> UploadError {
        match self {
            BackendError::Unauthenticated => UploadError::Unauthenticated,
            other => UploadError::TitleCheck {
                status: other.status(),
                message: other.message(),
            },
        }
    }

    /// Banner text: the backend's own message where there is one.
    fn message(&self) -> String {
        match self {
            BackendError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// HTTP client for the BowlersNetwork API with bearer auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    storage_client: Client,
    base_url: String,
    token: Option<String>,
    user_uid: Option<String>,
    bucket: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| UploadError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let storage_client = Client::builder()
            .connect_timeout(STORAGE_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| UploadError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            storage_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config
                .token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            user_uid: config.user_uid.clone(),
            bucket: config.bucket.clone(),
            retry: RetryPolicy::with_max_retries(config.max_retries),
        })
    }

    /// Create client from environment (see `ClientConfig::from_env`).
    pub fn from_env() -> Result<Self, UploadError> {
        let config = ClientConfig::from_env().map_err(|e| UploadError::Config(e.to_string()))?;
        Self::new(&config)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn user_uid(&self) -> Option<&str> {
        self.user_uid.as_deref()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Client used for presigned PUTs: no bearer header, no overall timeout.
    pub(crate) fn storage_client(&self) -> &Client {
        &self.storage_client
    }

    fn bearer(&self) -> Result<&str, BackendError> {
        self.token.as_deref().ok_or(BackendError::Unauthenticated)
    }

    /// POST a JSON body with bearer auth and return the raw response.
    pub(crate) async fn send_post<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<reqwest::Response, BackendError> {
        let token = self.bearer()?;
        let url = self.build_url(path);

        let mut request = self.client.post(&url).bearer_auth(token).json(body);
        if let Some(key) = idempotency_key {
            request = request.header(
                bowlers_core::constants::IDEMPOTENCY_KEY_HEADER,
                key.to_string(),
            );
        }

        let response = request.send().await?;
        Ok(response)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let response = self.send_post(path, body, None).await?;
        let response = error_for_status(response).await?;
        let body: T = response.json().await?;
        Ok(body)
    }

    /// POST JSON body and return whatever JSON (if any) comes back.
    pub async fn post_json_value<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<serde_json::Value, BackendError> {
        let response = self.send_post(path, body, idempotency_key).await?;
        let response = error_for_status(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    /// Raw client for custom requests. Caller must apply auth.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Turn a non-2xx response into a `BackendError` carrying the body's message.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthenticated);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        message: bowlers_core::models::extract_error_message(status.as_u16(), &error_text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_counts_as_signed_out() {
        let config = ClientConfig {
            token: Some("  ".to_string()),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert!(!client.is_signed_in());
    }

    #[test]
    fn trailing_slash_trimmed() {
        let config = ClientConfig {
            api_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.build_url("/api/photos"),
            "http://localhost:8080/api/photos"
        );
    }

    #[test]
    fn unauthenticated_maps_to_every_stage() {
        assert!(matches!(
            BackendError::Unauthenticated.into_initiation_error(),
            UploadError::Unauthenticated
        ));
        assert!(matches!(
            BackendError::Unauthenticated.into_commit_error(false),
            UploadError::Unauthenticated
        ));
    }

    #[test]
    fn status_message_is_kept_verbatim() {
        let err = BackendError::Status {
            status: 400,
            message: "Bucket not allowed".to_string(),
        }
        .into_initiation_error();
        assert_eq!(err.user_message(), "Bucket not allowed");
    }

    #[test]
    fn backend_retryability() {
        assert!(BackendError::Network("reset".into()).is_retryable());
        assert!(BackendError::Status { status: 502, message: String::new() }.is_retryable());
        assert!(!BackendError::Status { status: 422, message: String::new() }.is_retryable());
        assert!(!BackendError::Unauthenticated.is_retryable());
    }
}
