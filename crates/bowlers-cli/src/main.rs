//! Bowlers CLI: upload photos, videos and thumbnails to BowlersNetwork.
//!
//! Set BOWLERS_TOKEN (or BOWLERS_TOKEN_FILE) and BOWLERS_USER_UID. Ctrl-C
//! cancels an upload in flight.

use anyhow::Context;
use bowlers_api_client::{ApiClient, CommitTarget, DirectUpload, TitleChecker};
use bowlers_cli::{init_tracing, probe_duration_secs, render_progress, select_session};
use bowlers_core::constants::SUCCESS_REDIRECT_DELAY;
use bowlers_core::models::TitleAvailability;
use bowlers_core::{ClientConfig, MediaKind, UploadProgress, UploadSession};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "bowlers", about = "BowlersNetwork media upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a photo and save it to your gallery
    Photo {
        /// Path to the image file
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Upload a video (max 100MB) and publish it
    Video {
        /// Path to the video file
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Duration in seconds; measured with ffprobe when omitted
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Upload a video thumbnail and print its public URL
    Thumbnail {
        /// Path to the image file
        file: PathBuf,
    },
    /// Check whether a video title is still available
    CheckTitle { title: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Invalid BOWLERS_* configuration")?;
    let client = ApiClient::new(&config).context("Failed to create API client")?;

    match cli.command {
        Commands::Photo {
            file,
            title,
            description,
        } => {
            let session = select_session(MediaKind::Photo, &file)?;
            let target = CommitTarget::Photo { title, description };
            upload(&client, session, target).await?;
        }
        Commands::Video {
            file,
            title,
            description,
            duration,
        } => {
            let session = select_session(MediaKind::Video, &file)?;
            let duration_secs = match duration {
                Some(secs) => secs,
                None => probe_duration_secs(&config.ffprobe_path, &file)
                    .await
                    .context("Could not measure the video duration; pass --duration")?,
            };
            let target = CommitTarget::Video {
                title,
                description,
                duration_secs,
            };
            upload(&client, session, target).await?;
        }
        Commands::Thumbnail { file } => {
            let session = select_session(MediaKind::Thumbnail, &file)?;
            upload(&client, session, CommitTarget::Thumbnail).await?;
        }
        Commands::CheckTitle { title } => {
            let checker = TitleChecker::new(client);
            match checker.check(&title).await {
                Some(Ok(TitleAvailability::Available)) => println!("\"{}\" is available", title.trim()),
                Some(Ok(TitleAvailability::Taken)) => println!("\"{}\" is already taken", title.trim()),
                Some(Err(err)) => anyhow::bail!(err.user_message()),
                None => anyhow::bail!("Title is empty"),
            }
        }
    }

    Ok(())
}

async fn upload(
    client: &ApiClient,
    mut session: UploadSession,
    target: CommitTarget,
) -> anyhow::Result<()> {
    let total = session.selected_file().map(|f| f.size).unwrap_or_default();

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, cancelling upload");
                cancel.cancel();
            }
        })
    };

    let (progress, mut events) = watch::channel(UploadProgress::starting(total));
    let renderer = tokio::spawn(async move {
        let mut stderr = std::io::stderr();
        while events.changed().await.is_ok() {
            let line = render_progress(&events.borrow_and_update());
            let _ = write!(stderr, "\r{}", line);
            let _ = stderr.flush();
        }
        let _ = writeln!(stderr);
    });

    let result = DirectUpload::new(client)
        .run(&mut session, &target, &progress, &cancel)
        .await;

    drop(progress);
    let _ = renderer.await;
    interrupt.abort();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) if err.is_aborted() => anyhow::bail!("Upload cancelled"),
        Err(err) => anyhow::bail!(err.user_message()),
    };

    println!("{}", outcome.public_url);
    if let Some(record) = &outcome.record {
        println!("{}", serde_json::to_string_pretty(record).context("Serialize response")?);
    }
    if let Some(route) = outcome.redirect {
        tokio::time::sleep(SUCCESS_REDIRECT_DELAY).await;
        println!("View it at {}", route);
    }

    Ok(())
}
