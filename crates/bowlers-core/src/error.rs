//! Error types for the upload workflow
//!
//! Every failure an upload surface can hit is one `UploadError` variant. Errors
//! self-describe how they are presented (banner text, retryability, log level)
//! in the same way server errors describe their HTTP shape.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected user mistakes such as a wrong file type
    Debug,
    /// Recoverable or user-initiated outcomes
    Warn,
    /// Unexpected failures
    Error,
}

/// Why a file selection was refused before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Unsupported file type {content_type}: expected {expected}")]
    UnsupportedType {
        content_type: String,
        expected: &'static str,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Empty file")]
    Empty,

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("No file selected")]
    NoFile,
}

/// Outcome of a failed direct PUT to storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Upload cancelled")]
    Aborted,

    #[error("Network error during upload: {0}")]
    Network(String),

    #[error("Storage rejected the upload with HTTP {status}")]
    Storage { status: u16 },
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Not signed in or session expired")]
    Unauthenticated,

    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    #[error("Title is required")]
    MissingTitle,

    #[error("Title already taken: {0}")]
    TitleTaken(String),

    #[error("Upload initiation failed: {message}")]
    Initiation {
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Saving upload details failed: {message}")]
    Commit {
        status: Option<u16>,
        message: String,
        orphan_cleaned: bool,
    },

    #[error("Title check failed: {message}")]
    TitleCheck {
        status: Option<u16>,
        message: String,
    },

    #[error("An upload is already in progress")]
    Busy,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type UploadResult<T> = Result<T, UploadError>;

/// Whether a backend HTTP status is worth retrying.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

impl UploadError {
    /// Text shown in the page-level error banner.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Unauthenticated => {
                "Your session has expired. Please sign in again.".to_string()
            }
            UploadError::InvalidSelection(SelectionError::UnsupportedType { expected, .. }) => {
                format!("Please select a valid {} file.", expected)
            }
            UploadError::InvalidSelection(SelectionError::TooLarge { max, .. }) => {
                format!("File size must be less than {}MB.", max / 1024 / 1024)
            }
            UploadError::InvalidSelection(err) => err.to_string(),
            UploadError::MissingTitle => "Please enter a title.".to_string(),
            UploadError::TitleTaken(title) => {
                format!("The title \"{}\" is already taken.", title)
            }
            UploadError::Initiation { message, .. } => message.clone(),
            UploadError::Transfer(TransferError::Aborted) => "Upload cancelled.".to_string(),
            UploadError::Transfer(TransferError::Network(_)) => {
                "Network error during upload. Please try again.".to_string()
            }
            UploadError::Transfer(TransferError::Storage { status }) => {
                format!("Upload failed with status {}.", status)
            }
            UploadError::Commit { message, .. } => message.clone(),
            UploadError::TitleCheck { message, .. } => message.clone(),
            UploadError::Busy => "An upload is already in progress.".to_string(),
            UploadError::Io(err) => format!("Could not read the selected file: {}", err),
            UploadError::Config(msg) => msg.clone(),
        }
    }

    /// Whether the same backend call may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            UploadError::Initiation { status, .. }
            | UploadError::Commit { status, .. }
            | UploadError::TitleCheck { status, .. } => match status {
                Some(code) => is_retryable_status(*code),
                None => true,
            },
            UploadError::Transfer(TransferError::Network(_)) => true,
            _ => false,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, UploadError::Transfer(TransferError::Aborted))
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            UploadError::InvalidSelection(_)
            | UploadError::MissingTitle
            | UploadError::TitleTaken(_)
            | UploadError::Busy => LogLevel::Debug,
            UploadError::Unauthenticated | UploadError::Transfer(TransferError::Aborted) => {
                LogLevel::Warn
            }
            _ => LogLevel::Error,
        }
    }

    /// Emit this error through `tracing` at its own level.
    pub fn log(&self) {
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(error = %self, "Upload failed"),
            LogLevel::Warn => tracing::warn!(error = %self, "Upload failed"),
            LogLevel::Error => tracing::error!(error = %self, "Upload failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_message_contains_status() {
        let err = UploadError::from(TransferError::Storage { status: 403 });
        assert!(err.user_message().contains("403"));
        assert!(err.to_string().contains("403"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn unauthenticated_asks_to_sign_in() {
        assert!(UploadError::Unauthenticated
            .user_message()
            .contains("sign in again"));
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(429));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(409));
    }

    #[test]
    fn commit_without_status_is_retryable() {
        let err = UploadError::Commit {
            status: None,
            message: "connection reset".to_string(),
            orphan_cleaned: false,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn too_large_message_in_megabytes() {
        let err = UploadError::from(SelectionError::TooLarge {
            size: 200 * 1024 * 1024,
            max: 100 * 1024 * 1024,
        });
        assert_eq!(err.user_message(), "File size must be less than 100MB.");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn abort_is_distinguishable() {
        assert!(UploadError::from(TransferError::Aborted).is_aborted());
        assert!(!UploadError::from(TransferError::Network("reset".into())).is_aborted());
    }
}
