use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PHOTO_DESCRIPTION;

/// Body of `POST /api/photos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoCommit {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl PhotoCommit {
    /// Blank descriptions fall back to the default caption.
    pub fn new(title: &str, description: Option<&str>, url: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_PHOTO_DESCRIPTION)
                .to_string(),
            url: url.to_string(),
        }
    }
}
