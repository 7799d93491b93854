/// Reel - terminal music playlist player
use anyhow::Context;
use clap::Parser;
use reel_audio_desktop::CpalEngine;
use reel_playback::{JsonFileStore, PlaylistManager};
use reel_terminal::{App, AppConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Terminal music playlist player", long_about = None, version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Playlist record file
    #[arg(short, long)]
    playlist: Option<PathBuf>,

    /// Initial volume (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so logs stay out of the playlist view)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reel=info,reel_terminal=info,reel_playback=info,reel_audio_desktop=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(cli.playlist, cli.volume);
    config.validate()?;

    tracing::info!("Playlist: {}", config.playlist_path.display());

    let engine = CpalEngine::new().context("Failed to initialize audio output")?;
    let store = JsonFileStore::new(&config.playlist_path);
    let manager = PlaylistManager::new(engine, store, config.manager_config());

    App::new(manager).run(config.poll_interval()).await?;

    Ok(())
}
