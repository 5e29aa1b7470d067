use anyhow::Context;
use bowlers_core::{MediaKind, SelectedFile, UploadProgress, UploadSession};
use serde::Deserialize;
use std::path::Path;

const BAR_WIDTH: usize = 30;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Parse ffprobe `-of json` output into whole seconds, rounded to nearest.
pub fn parse_ffprobe_duration(stdout: &[u8]) -> anyhow::Result<u64> {
    let output: FfprobeOutput =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    let seconds = output
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .context("ffprobe reported no duration")?;

    Ok(seconds.round() as u64)
}

/// Session holding `file`, rejected up front if it breaks the selection rules.
///
/// Runs before ffprobe so a wrong type or oversized video reports the rule it broke.
pub fn select_session(kind: MediaKind, file: &Path) -> anyhow::Result<UploadSession> {
    let selected = SelectedFile::from_path(file)
        .with_context(|| format!("Cannot read {}", file.display()))?;

    let mut session = UploadSession::new(kind);
    session
        .select_file(selected)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    Ok(session)
}

/// Measure a local video's duration with ffprobe.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub async fn probe_duration_secs(ffprobe_path: &str, path: &Path) -> anyhow::Result<u64> {
    let output = tokio::process::Command::new(ffprobe_path)
        .arg("-v")
        .arg("error")
        .arg("-show_format")
        .arg("-of")
        .arg("json")
        .arg(path)
        .output()
        .await
        .with_context(|| format!("Failed to run {}", ffprobe_path))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffprobe failed: {}", stderr);
        anyhow::bail!("ffprobe failed: {}", stderr.trim());
    }

    let secs = parse_ffprobe_duration(&output.stdout)?;
    tracing::debug!(duration_secs = secs, "Measured video duration");
    Ok(secs)
}

/// One-line progress bar, e.g. `[#########.....]  60%  12.50 Mbps`.
pub fn render_progress(progress: &UploadProgress) -> String {
    let filled = BAR_WIDTH * progress.percent.min(100) as usize / 100;
    let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
    match &progress.speed {
        Some(speed) => format!("[{}] {:>3}%  {}", bar, progress.percent, speed),
        None => format!("[{}] {:>3}%", bar, progress.percent),
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
