use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ClientEvent, ClientSettings, LiveFeedListener, SelectedFile, UploadController,
};
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod terminal;

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Upload images for analysis and follow the live feed")]
struct Cli {
    /// Overrides `server_url` from dashboard.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Print only the raw JSON panel after an upload.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit an image and print the rendered results.
    Upload { file: Option<PathBuf> },
    /// Print other users' uploads as they arrive.
    Feed,
    /// Follow the live feed while submitting an image.
    Watch { file: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings().context("failed to load dashboard settings")?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }

    match cli.command {
        Command::Upload { file } => upload(&settings, file, cli.json).await,
        Command::Feed => follow_feed(&settings).await,
        Command::Watch { file } => {
            let listener = LiveFeedListener::new(&settings)?;
            let printer = tokio::spawn(print_feed(listener.subscribe_events()));
            let feed_task = listener.spawn();

            let outcome = upload(&settings, file, cli.json).await;
            if outcome.is_ok() {
                println!("Following live feed at {} (Ctrl-C to stop)", listener.feed_url());
                wait_for_ctrl_c().await?;
            }

            feed_task.abort();
            printer.abort();
            outcome
        }
    }
}

async fn upload(settings: &ClientSettings, file: Option<PathBuf>, json: bool) -> Result<()> {
    let controller = UploadController::new(settings)?;
    let mut events = controller.subscribe_events();

    let selected = match file {
        Some(path) => Some(SelectedFile::from_path(&path).await?),
        None => None,
    };
    let outcome = controller.submit(selected).await;

    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Alert(alert) = event {
            terminal::print_alert(&alert);
        }
    }

    let view = outcome?;
    if json {
        println!("{}", view.raw_json);
    } else {
        terminal::print_view(&view);
    }
    Ok(())
}

async fn follow_feed(settings: &ClientSettings) -> Result<()> {
    let listener = LiveFeedListener::new(settings)?;
    let printer = tokio::spawn(print_feed(listener.subscribe_events()));
    let feed_task = listener.spawn();
    println!("Following live feed at {} (Ctrl-C to stop)", listener.feed_url());

    wait_for_ctrl_c().await?;
    feed_task.abort();
    printer.abort();
    Ok(())
}

async fn print_feed(events: broadcast::Receiver<ClientEvent>) {
    let mut stream = BroadcastStream::new(events);
    while let Some(event) = stream.next().await {
        match event {
            Ok(ClientEvent::FeedEntryAdded(entry)) => terminal::print_feed_entry(&entry),
            Ok(ClientEvent::FeedConnection(state)) => info!(?state, "live feed connection"),
            Ok(ClientEvent::Error(message)) => warn!(%message, "live feed error"),
            Ok(_) => {}
            Err(err) => warn!(%err, "live feed printer fell behind"),
        }
    }
}

async fn wait_for_ctrl_c() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")
}
