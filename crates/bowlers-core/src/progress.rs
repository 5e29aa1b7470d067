//! Transfer progress and throughput
//!
//! Percentages are clamped to be non-decreasing within one attempt. Throughput
//! is recomputed once per sampling tick from the bytes sent since the last
//! tick; there is no smoothing beyond that window.

use std::time::Duration;

/// Snapshot published to observers of a running transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
    /// 0..=100
    pub percent: u8,
    /// Last sampled throughput, e.g. `"12.50 Mbps"`; `None` before the first tick
    pub speed: Option<String>,
}

impl UploadProgress {
    pub fn starting(total_bytes: u64) -> Self {
        Self {
            bytes_sent: 0,
            total_bytes,
            percent: 0,
            speed: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percent == 100
    }
}

/// Accumulates sent bytes and keeps the reported percentage monotonic.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_bytes: u64,
    bytes_sent: u64,
    percent: u8,
}

impl ProgressTracker {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            bytes_sent: 0,
            percent: 0,
        }
    }

    /// Record `n` more bytes handed to the transport. Returns the new percentage.
    pub fn advance(&mut self, n: u64) -> u8 {
        self.bytes_sent = self.bytes_sent.saturating_add(n).min(self.total_bytes);
        // Never report 100 until the storage response confirms the upload.
        let computed = percent_of(self.bytes_sent, self.total_bytes).min(99);
        self.percent = self.percent.max(computed);
        self.percent
    }

    /// Mark the transfer as acknowledged by storage.
    pub fn complete(&mut self) -> u8 {
        self.bytes_sent = self.total_bytes;
        self.percent = 100;
        self.percent
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }
}

fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((sent as u128 * 100) / total as u128).min(100) as u8
}

/// Samples bytes-per-window and renders them as a bit rate.
#[derive(Debug, Clone, Default)]
pub struct ThroughputMeter {
    last_sample_bytes: u64,
    current: Option<String>,
}

impl ThroughputMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a sample at a tick. `total_sent` is the cumulative byte count.
    pub fn sample(&mut self, total_sent: u64, window: Duration) -> String {
        let delta = total_sent.saturating_sub(self.last_sample_bytes);
        self.last_sample_bytes = total_sent;

        let secs = window.as_secs_f64();
        let bits_per_sec = if secs > 0.0 {
            (delta as f64 * 8.0) / secs
        } else {
            0.0
        };

        let formatted = format_bitrate(bits_per_sec);
        self.current = Some(formatted.clone());
        formatted
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

/// Render bits/second with two decimals in bps, Kbps, Mbps or Gbps.
pub fn format_bitrate(bits_per_sec: f64) -> String {
    const K: f64 = 1_000.0;
    const M: f64 = 1_000_000.0;
    const G: f64 = 1_000_000_000.0;

    if bits_per_sec >= G {
        format!("{:.2} Gbps", bits_per_sec / G)
    } else if bits_per_sec >= M {
        format!("{:.2} Mbps", bits_per_sec / M)
    } else if bits_per_sec >= K {
        format!("{:.2} Kbps", bits_per_sec / K)
    } else {
        format!("{:.2} bps", bits_per_sec)
    }
}
