//! Environment-driven configuration

use anyhow::{Context, Result};

const DEFAULT_BIND: &str = "0.0.0.0:4567";

pub struct AppConfig {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            spotify_client_id: std::env::var("SPOTIFY_CLIENT_ID")
                .context("SPOTIFY_CLIENT_ID is not set")?,
            spotify_client_secret: std::env::var("SPOTIFY_CLIENT_SECRET")
                .context("SPOTIFY_CLIENT_SECRET is not set")?,
            bind_addr: std::env::var("JUKEY_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
        })
    }
}
