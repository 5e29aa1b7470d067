//! BowlersNetwork Core Library
//!
//! Domain models, error types, configuration, selection rules, progress math
//! and the upload session state machine shared by the API client and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod progress;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{LogLevel, SelectionError, TransferError, UploadError, UploadResult};
pub use progress::{format_bitrate, ProgressTracker, ThroughputMeter, UploadProgress};
pub use session::{Attempt, Reservation, UploadSession, UploadState};
pub use validation::{validate_selection, validate_title, MediaKind, SelectedFile};
