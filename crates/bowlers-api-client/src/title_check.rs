//! Debounced video title availability checks
//!
//! Each call waits for the quiet period; a newer call made in the meantime
//! supersedes it, and the superseded call never reaches the network.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bowlers_core::constants::TITLE_CHECK_DEBOUNCE;
use bowlers_core::models::TitleAvailability;
use bowlers_core::UploadResult;

use crate::ApiClient;

#[derive(Clone, Debug)]
pub struct TitleChecker {
    client: ApiClient,
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl TitleChecker {
    pub fn new(client: ApiClient) -> Self {
        Self::with_delay(client, TITLE_CHECK_DEBOUNCE)
    }

    pub fn with_delay(client: ApiClient, delay: Duration) -> Self {
        Self {
            client,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Check `title` once input has settled.
    ///
    /// Returns `None` when superseded or when the title is blank.
    pub async fn check(&self, title: &str) -> Option<UploadResult<TitleAvailability>> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::trace!(title, "Title check superseded");
            return None;
        }
        if title.trim().is_empty() {
            return None;
        }

        Some(self.client.check_video_title(title).await)
    }
}
