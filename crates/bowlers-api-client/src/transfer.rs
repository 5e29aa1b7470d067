//! Direct PUT of a local file to a presigned storage URL
//!
//! The file is streamed from disk. Bytes handed to the transport are counted
//! and published as `UploadProgress` on a watch channel; throughput is sampled
//! once per `THROUGHPUT_SAMPLE_INTERVAL`. Both timers live inside the transfer
//! future and stop with it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bowlers_core::constants::THROUGHPUT_SAMPLE_INTERVAL;
use bowlers_core::{
    ProgressTracker, SelectedFile, ThroughputMeter, TransferError, UploadProgress, UploadResult,
};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use crate::ApiClient;

/// How often the byte counter is turned into a progress event.
const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl ApiClient {
    /// PUT `file` to `presigned_url`.
    ///
    /// Resolves to `TransferError::Aborted` as soon as `cancel` fires; the
    /// in-flight request is dropped. No bearer header is sent.
    #[tracing::instrument(skip_all, fields(service = "upload", file_name = %file.file_name, size = file.size))]
    pub async fn put_presigned(
        &self,
        presigned_url: &str,
        file: &SelectedFile,
        progress: &watch::Sender<UploadProgress>,
        cancel: &CancellationToken,
    ) -> UploadResult<()> {
        if cancel.is_cancelled() {
            return Err(TransferError::Aborted.into());
        }

        let handle = tokio::fs::File::open(&file.path).await?;
        let sent = Arc::new(AtomicU64::new(0));
        let counter = sent.clone();
        let stream = ReaderStream::new(handle).inspect_ok(move |chunk: &Bytes| {
            counter.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        });

        let request = self
            .storage_client()
            .put(presigned_url)
            .header(CONTENT_TYPE, file.content_type.as_str())
            .header(CONTENT_LENGTH, file.size)
            .body(reqwest::Body::wrap_stream(stream));

        let mut tracker = ProgressTracker::new(file.size);
        let mut meter = ThroughputMeter::new();
        progress.send_replace(UploadProgress::starting(file.size));

        let mut poll = interval(PROGRESS_POLL_INTERVAL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sampler = interval_at(
            Instant::now() + THROUGHPUT_SAMPLE_INTERVAL,
            THROUGHPUT_SAMPLE_INTERVAL,
        );
        sampler.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let send = request.send();
        tokio::pin!(send);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(bytes_sent = tracker.bytes_sent(), "Upload aborted by user");
                    return Err(TransferError::Aborted.into());
                }
                result = &mut send => {
                    let response = result.map_err(|e| TransferError::Network(e.to_string()))?;
                    let status = response.status();
                    if !status.is_success() {
                        tracing::error!(status = status.as_u16(), "Storage rejected upload");
                        return Err(TransferError::Storage { status: status.as_u16() }.into());
                    }

                    tracker.complete();
                    publish(progress, &tracker, &meter);
                    tracing::info!(bytes = file.size, "Upload transferred");
                    return Ok(());
                }
                _ = sampler.tick() => {
                    let speed = meter.sample(sent.load(Ordering::Relaxed), THROUGHPUT_SAMPLE_INTERVAL);
                    tracing::debug!(%speed, percent = tracker.percent(), "Upload throughput");
                    publish(progress, &tracker, &meter);
                }
                _ = poll.tick() => {
                    let total = sent.load(Ordering::Relaxed);
                    let delta = total.saturating_sub(tracker.bytes_sent());
                    if delta > 0 {
                        tracker.advance(delta);
                        publish(progress, &tracker, &meter);
                    }
                }
            }
        }
    }
}

fn publish(
    progress: &watch::Sender<UploadProgress>,
    tracker: &ProgressTracker,
    meter: &ThroughputMeter,
) {
    progress.send_replace(UploadProgress {
        bytes_sent: tracker.bytes_sent(),
        total_bytes: tracker.total_bytes(),
        percent: tracker.percent(),
        speed: meter.current().map(str::to_string),
    });
}
