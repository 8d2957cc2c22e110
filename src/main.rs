mod chat;
mod config;
mod error;
mod jukebox;
mod logging;
mod model;
mod player;
mod server;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Result;

use config::AppConfig;
use jukebox::{Jukebox, WatchTuning};
use model::SpotifyProvider;
use player::AppleScriptPlayer;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== JUKEy starting ===");

    let config = AppConfig::from_env()?;

    let provider =
        SpotifyProvider::connect(&config.spotify_client_id, &config.spotify_client_secret).await?;
    let player = AppleScriptPlayer::new();

    let jukebox = Jukebox::new(
        Arc::new(provider),
        Arc::new(player),
        WatchTuning::default(),
    );

    server::start(&config.bind_addr, jukebox).await
}
