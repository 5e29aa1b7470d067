//! Wire bodies exchanged with the BowlersNetwork backend
//!
//! Shapes mirror the backend's JSON exactly; entities themselves are owned by
//! the backend and only mirrored here for the lifetime of an upload.

mod api_error;
mod photo;
mod upload;
mod video;

pub use api_error::{extract_error_message, ApiErrorBody};
pub use photo::PhotoCommit;
pub use upload::{AbortParams, AbortUploadRequest, InitiateUploadRequest, UploadTicket};
pub use video::{TitleAvailability, TitleCheckRequest, VideoCommit};
