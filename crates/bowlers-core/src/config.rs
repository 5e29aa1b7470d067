//! Configuration module
//!
//! Client configuration is read from the environment (after loading `.env`).
//! The bearer token may come inline or from a token file, which plays the role
//! of the browser's cached local-storage credential.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_BUCKET, DEFAULT_FFPROBE_PATH, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Upper bound on configured retries; more than this only delays the error banner.
const MAX_CONFIGURED_RETRIES: u32 = 10;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub user_uid: Option<String>,
    pub bucket: String,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub ffprobe_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_uid: None,
            bucket: DEFAULT_BUCKET.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            ffprobe_path: DEFAULT_FFPROBE_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("BOWLERS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let token = match env::var("BOWLERS_TOKEN") {
            Ok(token) => Some(token),
            Err(_) => match env::var("BOWLERS_TOKEN_FILE") {
                Ok(path) => read_token_file(&PathBuf::from(path))?,
                Err(_) => None,
            },
        };

        let max_retries = match env::var("BOWLERS_MAX_RETRIES") {
            Ok(v) => v
                .parse()
                .map_err(|_| anyhow::anyhow!("BOWLERS_MAX_RETRIES must be a number, got {}", v))?,
            Err(_) => DEFAULT_MAX_RETRIES,
        };

        let request_timeout_secs = match env::var("BOWLERS_REQUEST_TIMEOUT_SECS") {
            Ok(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("BOWLERS_REQUEST_TIMEOUT_SECS must be a number, got {}", v)
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let config = Self {
            api_url,
            token,
            user_uid: env::var("BOWLERS_USER_UID").ok(),
            bucket: env::var("BOWLERS_UPLOAD_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            max_retries,
            request_timeout_secs,
            ffprobe_path: env::var("BOWLERS_FFPROBE_PATH")
                .unwrap_or_else(|_| DEFAULT_FFPROBE_PATH.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "BOWLERS_API_URL must start with http:// or https://, got {}",
                self.api_url
            ));
        }
        if self.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("BOWLERS_UPLOAD_BUCKET must not be empty"));
        }
        if self.max_retries > MAX_CONFIGURED_RETRIES {
            return Err(anyhow::anyhow!(
                "BOWLERS_MAX_RETRIES must be at most {}",
                MAX_CONFIGURED_RETRIES
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("BOWLERS_REQUEST_TIMEOUT_SECS must be positive"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether a non-empty bearer token is available.
    pub fn is_signed_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Read a cached token. An empty file counts as signed out.
fn read_token_file(path: &PathBuf) -> Result<Option<String>, anyhow::Error> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read token file {}: {}", path.display(), e))?;
    let token = raw.trim();
    if token.is_empty() {
        Ok(None)
    } else {
        Ok(Some(token.to_string()))
    }
}
