//! Upload session state machine
//!
//! One session per upload surface instance. States move
//! `Idle -> Uploading -> {Success | Error}`; an error or an aborted upload
//! returns to `Idle` keeping the selected file, while success clears the
//! selection. Dropping a session cancels any in-flight transfer.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{SelectionError, UploadError};
use crate::models::UploadTicket;
use crate::progress::UploadProgress;
use crate::validation::{validate_selection, MediaKind, SelectedFile};

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    Uploading(UploadProgress),
    Success {
        public_url: String,
        /// Route to navigate to after the redirect delay
        redirect: Option<String>,
    },
    Error {
        message: String,
    },
}

/// Key and URL reserved by the backend for the current attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub key: String,
    pub public_url: String,
}

/// Handles given to the transfer when an attempt starts.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub file: SelectedFile,
    pub cancel: CancellationToken,
    /// Deduplication key sent with the commit of this attempt
    pub idempotency_key: Uuid,
}

#[derive(Debug)]
pub struct UploadSession {
    kind: MediaKind,
    file: Option<SelectedFile>,
    preview_url: Option<String>,
    cancel: Option<CancellationToken>,
    reservation: Option<Reservation>,
    state: UploadState,
}

impl UploadSession {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            file: None,
            preview_url: None,
            cancel: None,
            reservation: None,
            state: UploadState::Idle,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn reservation(&self) -> Option<&Reservation> {
        self.reservation.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, UploadState::Uploading(_))
    }

    /// Replace the selection. Rejected files leave the previous selection intact.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), UploadError> {
        if self.is_uploading() {
            return Err(UploadError::Busy);
        }
        validate_selection(self.kind, &file)?;

        self.preview_url = Some(file.preview_url());
        self.file = Some(file);
        self.state = UploadState::Idle;
        Ok(())
    }

    /// Start an attempt with the current selection.
    pub fn begin(&mut self) -> Result<Attempt, UploadError> {
        self.start(CancellationToken::new())
    }

    /// Start an attempt that is also cancelled when `parent` is.
    pub fn begin_with(&mut self, parent: &CancellationToken) -> Result<Attempt, UploadError> {
        self.start(parent.child_token())
    }

    fn start(&mut self, cancel: CancellationToken) -> Result<Attempt, UploadError> {
        if self.is_uploading() {
            return Err(UploadError::Busy);
        }
        let file = self.file.clone().ok_or(SelectionError::NoFile)?;

        self.cancel = Some(cancel.clone());
        self.reservation = None;
        self.state = UploadState::Uploading(UploadProgress::starting(file.size));

        tracing::debug!(file_name = %file.file_name, size = file.size, "Upload attempt started");

        Ok(Attempt {
            file,
            cancel,
            idempotency_key: Uuid::new_v4(),
        })
    }

    pub fn reserve(&mut self, ticket: &UploadTicket) {
        if self.is_uploading() {
            self.reservation = Some(Reservation {
                key: ticket.key.clone(),
                public_url: ticket.public_url.clone(),
            });
        }
    }

    /// Apply a progress event. Late or out-of-order events never move the bar backwards.
    pub fn on_progress(&mut self, progress: UploadProgress) {
        if let UploadState::Uploading(current) = &mut self.state {
            let percent = current.percent.max(progress.percent);
            *current = UploadProgress {
                percent,
                ..progress
            };
        }
    }

    /// Trip the cancellation handle. Returns the reserved key that should be released.
    pub fn cancel(&mut self) -> Option<String> {
        if let Some(token) = &self.cancel {
            token.cancel();
        }
        self.reservation.as_ref().map(|r| r.key.clone())
    }

    pub fn succeed(&mut self, public_url: String, redirect: Option<String>) {
        self.cancel = None;
        self.reservation = None;
        self.file = None;
        self.preview_url = None;
        self.state = UploadState::Success {
            public_url,
            redirect,
        };
    }

    /// Record a failed attempt. Aborts go straight back to `Idle`.
    pub fn fail(&mut self, err: &UploadError) {
        self.cancel = None;
        self.reservation = None;
        self.state = if err.is_aborted() {
            UploadState::Idle
        } else {
            UploadState::Error {
                message: err.user_message(),
            }
        };
    }

    /// Close the error banner.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, UploadState::Error { .. }) {
            self.state = UploadState::Idle;
        }
    }

    /// Clear the form entirely.
    pub fn reset(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.file = None;
        self.preview_url = None;
        self.reservation = None;
        self.state = UploadState::Idle;
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}
