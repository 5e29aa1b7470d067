//! Direct-to-storage upload workflow
//!
//! One parametrized flow for the photo, video and thumbnail surfaces:
//!
//! 1. validate the form (and, for videos, run the advisory title check)
//! 2. initiate: obtain `{key, public_url, presigned_url}`
//! 3. PUT the file bytes straight to storage
//! 4. commit metadata, deduplicated by a per-attempt idempotency key
//!
//! Cancellation is honoured from initiation onwards. A failed or cancelled
//! transfer releases the reserved key. A commit that fails after the bytes
//! landed also releases the key so the object doesn't linger as an orphan.
//! Both releases are best-effort.

use bowlers_core::models::{PhotoCommit, TitleAvailability, UploadTicket, VideoCommit};
use bowlers_core::{
    validate_title, Attempt, MediaKind, TransferError, UploadError, UploadProgress, UploadResult,
    UploadSession,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::ApiClient;

/// What to persist once the bytes are in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitTarget {
    Photo {
        title: String,
        description: Option<String>,
    },
    Video {
        title: String,
        description: Option<String>,
        duration_secs: u64,
    },
    /// Nothing is committed; the caller attaches the URL to a video edit.
    Thumbnail,
}

impl CommitTarget {
    pub fn kind(&self) -> MediaKind {
        match self {
            CommitTarget::Photo { .. } => MediaKind::Photo,
            CommitTarget::Video { .. } => MediaKind::Video,
            CommitTarget::Thumbnail => MediaKind::Thumbnail,
        }
    }

    fn title(&self) -> Option<&str> {
        match self {
            CommitTarget::Photo { title, .. } | CommitTarget::Video { title, .. } => Some(title),
            CommitTarget::Thumbnail => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub key: String,
    pub public_url: String,
    /// Backend response to the commit, `None` for thumbnails
    pub record: Option<serde_json::Value>,
    /// Route to follow after `SUCCESS_REDIRECT_DELAY`
    pub redirect: Option<String>,
}

pub struct DirectUpload<'a> {
    client: &'a ApiClient,
    bucket: String,
}

impl<'a> DirectUpload<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            bucket: client.bucket().to_string(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Run one upload attempt for the file selected in `session`.
    ///
    /// The session ends in `Success`, `Error`, or (after cancellation) `Idle`
    /// with its file retained. Cancelling `cancel` aborts the attempt.
    pub async fn run(
        &self,
        session: &mut UploadSession,
        target: &CommitTarget,
        progress: &watch::Sender<UploadProgress>,
        cancel: &CancellationToken,
    ) -> UploadResult<UploadOutcome> {
        if session.is_uploading() {
            return Err(UploadError::Busy);
        }

        let result = self.attempt(session, target, progress, cancel).await;
        match &result {
            Ok(outcome) => {
                session.succeed(outcome.public_url.clone(), outcome.redirect.clone());
            }
            Err(err) => {
                err.log();
                session.fail(err);
            }
        }
        result
    }

    async fn attempt(
        &self,
        session: &mut UploadSession,
        target: &CommitTarget,
        progress: &watch::Sender<UploadProgress>,
        cancel: &CancellationToken,
    ) -> UploadResult<UploadOutcome> {
        if target.kind() != session.kind() {
            return Err(UploadError::Config(format!(
                "{:?} details cannot be committed from a {:?} upload",
                target.kind(),
                session.kind()
            )));
        }
        if !self.client.is_signed_in() {
            return Err(UploadError::Unauthenticated);
        }
        if let Some(title) = target.title() {
            validate_title(title)?;
        }
        if let CommitTarget::Video { title, .. } = target {
            self.precheck_title(title).await?;
        }

        let attempt = session.begin_with(cancel)?;

        // Cancelling here drops the in-flight request along with any backoff sleep.
        let ticket = tokio::select! {
            biased;
            _ = attempt.cancel.cancelled() => {
                tracing::warn!(file_name = %attempt.file.file_name, "Upload aborted during initiation");
                return Err(TransferError::Aborted.into());
            }
            ticket = self.client.initiate_upload(&self.bucket, &attempt.file.file_name) => ticket?,
        };
        session.reserve(&ticket);

        if let Err(err) = self.transfer(session, &attempt, &ticket, progress).await {
            if err.is_aborted() {
                session.cancel();
            }
            tracing::warn!(key = %ticket.key, error = %err, "Transfer failed, releasing key");
            self.client.abort_upload(&self.bucket, &ticket.key).await;
            return Err(err);
        }

        let record = self.commit(target, &attempt, &ticket).await?;

        let redirect = self
            .client
            .user_uid()
            .and_then(|uid| target.kind().success_route(uid));

        Ok(UploadOutcome {
            key: ticket.key,
            public_url: ticket.public_url,
            record,
            redirect,
        })
    }

    /// Advisory: a title the backend already reports as taken blocks the upload,
    /// but a failed check does not.
    async fn precheck_title(&self, title: &str) -> UploadResult<()> {
        match self.client.check_video_title(title).await {
            Ok(TitleAvailability::Available) => Ok(()),
            Ok(TitleAvailability::Taken) => Err(UploadError::TitleTaken(title.trim().to_string())),
            Err(UploadError::Unauthenticated) => Err(UploadError::Unauthenticated),
            Err(err) => {
                tracing::warn!(error = %err, "Title check failed, continuing with upload");
                Ok(())
            }
        }
    }

    /// Drive the PUT while mirroring its progress into the session.
    async fn transfer(
        &self,
        session: &mut UploadSession,
        attempt: &Attempt,
        ticket: &UploadTicket,
        progress: &watch::Sender<UploadProgress>,
    ) -> UploadResult<()> {
        let mut events = progress.subscribe();
        let put = self.client.put_presigned(
            &ticket.presigned_url,
            &attempt.file,
            progress,
            &attempt.cancel,
        );
        tokio::pin!(put);

        loop {
            tokio::select! {
                result = &mut put => {
                    session.on_progress(progress.borrow().clone());
                    return result;
                }
                Ok(()) = events.changed() => {
                    session.on_progress(events.borrow_and_update().clone());
                }
            }
        }
    }

    async fn commit(
        &self,
        target: &CommitTarget,
        attempt: &Attempt,
        ticket: &UploadTicket,
    ) -> UploadResult<Option<serde_json::Value>> {
        let result = match target {
            CommitTarget::Photo { title, description } => {
                let body = PhotoCommit::new(title, description.as_deref(), &ticket.public_url);
                self.client.commit_photo(&body, attempt.idempotency_key).await
            }
            CommitTarget::Video {
                title,
                description,
                duration_secs,
            } => {
                let body = VideoCommit::new(
                    title,
                    description.as_deref(),
                    *duration_secs,
                    &ticket.public_url,
                );
                self.client.commit_video(&body, attempt.idempotency_key).await
            }
            CommitTarget::Thumbnail => return Ok(None),
        };

        match result {
            Ok(record) => {
                tracing::info!(key = %ticket.key, "Upload committed");
                Ok(Some(record))
            }
            Err(err) => {
                tracing::error!(key = %ticket.key, error = %err, "Commit failed after transfer, releasing key");
                let orphan_cleaned = self.client.abort_upload(&self.bucket, &ticket.key).await;
                Err(err.into_commit_error(orphan_cleaned))
            }
        }
    }
}
