//! Backend paths, buckets and limits shared by the upload surfaces.

use std::time::Duration;

/// Production backend host.
pub const DEFAULT_API_URL: &str = "https://api.bowlersnetwork.com";

/// Public object-storage bucket used by every upload surface.
pub const DEFAULT_BUCKET: &str = "cdn";

pub const INITIATE_UPLOAD_PATH: &str = "/api/cloud/upload/singlepart/requests/initiate";
pub const ABORT_UPLOAD_PATH: &str = "/api/cloud/upload/singlepart/requests/abort";
pub const PHOTOS_PATH: &str = "/api/photos";
pub const LARGE_VIDEOS_PATH: &str = "/api/tube/large-videos";
pub const VALIDATE_VIDEO_METADATA_PATH: &str = "/api/tube/large-videos/validate-metadata";

/// Videos above this size are rejected at selection time (100 MB).
pub const MAX_VIDEO_SIZE_BYTES: u64 = 100 * 1024 * 1024;

pub const DEFAULT_PHOTO_DESCRIPTION: &str = "Photo uploaded via BowlersNetwork";
pub const DEFAULT_VIDEO_DESCRIPTION: &str = "Video uploaded via BowlersNetwork";

/// Type tag sent with every large-video commit.
pub const VIDEO_TYPE_TAG: &str = "discover";

/// Header carrying the per-attempt deduplication key on commits.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Quiet period before a title availability check is sent.
pub const TITLE_CHECK_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Delay between a successful commit and following the redirect route.
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Throughput sampling window.
pub const THROUGHPUT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
