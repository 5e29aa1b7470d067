//! Domain methods for the BowlersNetwork upload endpoints.

use bowlers_core::constants::{
    ABORT_UPLOAD_PATH, INITIATE_UPLOAD_PATH, LARGE_VIDEOS_PATH, PHOTOS_PATH,
    VALIDATE_VIDEO_METADATA_PATH,
};
use bowlers_core::models::{
    extract_error_message, AbortUploadRequest, InitiateUploadRequest, PhotoCommit,
    TitleAvailability, TitleCheckRequest, UploadTicket, VideoCommit,
};
use bowlers_core::{UploadError, UploadResult};
use uuid::Uuid;

use crate::retry::with_retry;
use crate::{error_for_status, ApiClient, BackendError};

impl ApiClient {
    /// Request a one-time write credential for `file_name` in `bucket`.
    #[tracing::instrument(skip(self), fields(service = "upload"))]
    pub async fn initiate_upload(&self, bucket: &str, file_name: &str) -> UploadResult<UploadTicket> {
        if !self.is_signed_in() {
            return Err(UploadError::Unauthenticated);
        }

        let body = InitiateUploadRequest {
            bucket: bucket.to_string(),
            file_name: file_name.to_string(),
        };

        let body = &body;
        let ticket: UploadTicket = with_retry(self.retry_policy(), "initiate_upload", move || {
            self.post_json(INITIATE_UPLOAD_PATH, body)
        })
        .await
        .map_err(BackendError::into_initiation_error)?;

        tracing::info!(key = %ticket.key, "Upload ticket issued");
        Ok(ticket)
    }

    /// Ask the backend to release a reserved key.
    ///
    /// Best-effort: failures are logged and reported as `false`, never raised.
    #[tracing::instrument(skip(self), fields(service = "upload"))]
    pub async fn abort_upload(&self, bucket: &str, key: &str) -> bool {
        let body = AbortUploadRequest::new(bucket, key);
        let result = match self.send_post(ABORT_UPLOAD_PATH, &body, None).await {
            Ok(response) => error_for_status(response).await.map(|_| ()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(key, "Reserved upload key released");
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to release reserved upload key");
                false
            }
        }
    }

    /// Persist photo metadata pointing at an uploaded object.
    #[tracing::instrument(skip(self, commit), fields(service = "upload", title = %commit.title))]
    pub async fn commit_photo(
        &self,
        commit: &PhotoCommit,
        idempotency_key: Uuid,
    ) -> Result<serde_json::Value, BackendError> {
        with_retry(self.retry_policy(), "commit_photo", move || {
            self.post_json_value(PHOTOS_PATH, commit, Some(idempotency_key))
        })
        .await
    }

    /// Persist large-video metadata pointing at an uploaded object.
    #[tracing::instrument(skip(self, commit), fields(service = "upload", title = %commit.title))]
    pub async fn commit_video(
        &self,
        commit: &VideoCommit,
        idempotency_key: Uuid,
    ) -> Result<serde_json::Value, BackendError> {
        with_retry(self.retry_policy(), "commit_video", move || {
            self.post_json_value(LARGE_VIDEOS_PATH, commit, Some(idempotency_key))
        })
        .await
    }

    /// Advisory availability check for a video title.
    #[tracing::instrument(skip(self), fields(service = "upload"))]
    pub async fn check_video_title(&self, title: &str) -> UploadResult<TitleAvailability> {
        let body = TitleCheckRequest {
            title: title.trim().to_string(),
        };

        let response = self
            .send_post(VALIDATE_VIDEO_METADATA_PATH, &body, None)
            .await
            .map_err(BackendError::into_title_check_error)?;

        let status = response.status().as_u16();
        if let Some(availability) = TitleAvailability::from_status(status) {
            tracing::debug!(status, ?availability, "Title check answered");
            return Ok(availability);
        }
        if status == 401 || status == 403 {
            return Err(UploadError::Unauthenticated);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(UploadError::TitleCheck {
            status: Some(status),
            message: extract_error_message(status, &error_text),
        })
    }
}
