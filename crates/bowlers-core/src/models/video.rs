use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_VIDEO_DESCRIPTION, VIDEO_TYPE_TAG};

/// Body of `POST /api/tube/large-videos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCommit {
    pub title: String,
    pub description: String,
    pub video_type: String,
    /// Duration in whole seconds
    pub duration: u64,
    pub url: String,
}

impl VideoCommit {
    pub fn new(title: &str, description: Option<&str>, duration: u64, url: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_VIDEO_DESCRIPTION)
                .to_string(),
            video_type: VIDEO_TYPE_TAG.to_string(),
            duration,
            url: url.to_string(),
        }
    }
}

/// Body of `POST /api/tube/large-videos/validate-metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCheckRequest {
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleAvailability {
    Available,
    Taken,
}

impl TitleAvailability {
    /// 200 means available, 400/409 mean taken; anything else is not an answer.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200 => Some(TitleAvailability::Available),
            400 | 409 => Some(TitleAvailability::Taken),
            _ => None,
        }
    }
}
