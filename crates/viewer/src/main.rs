//! `mentor-viewer` -- headless lecture viewer.
//!
//! Reads one command per line from stdin (`pause 12.5`, `explain 3`,
//! `context 3`, `return`, ...) and writes every viewer event to stdout as
//! a JSON line. Logs go to stderr.
//!
//! # Environment variables
//!
//! See [`ViewerConfig::from_env`]. `MENTOR_CATALOG_PATH` switches from the
//! HTTP backend to an offline JSON catalog.

use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mentor_core::types::DisplayedSize;
use mentor_services::{CatalogService, LectureApi, LectureService};
use mentor_viewer::driver::{self, Command, Outcome};
use mentor_viewer::{SimulatedPlayer, Viewer, ViewerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentor_viewer=info,mentor_services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ViewerConfig::from_env()?;

    tracing::info!(
        lecture = %config.lecture,
        initial_video = config.initial_video,
        offline = config.catalog_path.is_some(),
        "Starting mentor-viewer",
    );

    let player = SimulatedPlayer::new(
        DisplayedSize::new(config.display_width, config.display_height),
        !config.manual_ready,
    );

    match &config.catalog_path {
        Some(path) => {
            let service = CatalogService::load(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            run(service, player, &config).await
        }
        None => {
            let timeout = Duration::from_secs(config.request_timeout_secs);
            let service = LectureApi::with_timeout(&config.api_url, timeout)
                .context("creating lecture API client")?;
            run(service, player, &config).await
        }
    }
}

async fn run<S: LectureService>(
    service: S,
    player: SimulatedPlayer,
    config: &ViewerConfig,
) -> anyhow::Result<()> {
    let mut viewer = Viewer::new(
        service,
        player,
        config.lecture.clone(),
        config.initial_video,
        config.default_fps,
    );

    let mut events = viewer.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::error!(error = %e, "Failed to serialise event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    viewer.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(input = %line, error = %e, "Ignoring command");
                continue;
            }
        };
        match driver::dispatch(&mut viewer, command).await {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Snapshot(snapshot)) => {
                println!("{}", serde_json::to_string(&snapshot)?);
            }
            Ok(Outcome::Quit) => break,
            Err(e) => tracing::warn!(input = %line, error = %e, "Ignoring command"),
        }
        // Let the printer drain events published by this command.
        tokio::task::yield_now().await;
    }

    drop(viewer);
    printer.await.context("event printer task failed")?;
    tracing::info!("mentor-viewer stopped");
    Ok(())
}
