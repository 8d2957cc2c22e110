//! AppleScript control of the desktop Spotify app
//!
//! Each command is one `osascript` invocation. The app occasionally
//! stalls, so every invocation is killed after a short deadline and the
//! call reported as failed/missing instead.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::model::PlayerState;

use super::{quantize_volume, PlayerControlPort};

/// osascript invocations are killed after this long
const COMMAND_TIMEOUT: Duration = Duration::from_millis(500);

const DO_PLAYPAUSE: &str = r#"tell application "Spotify" to playpause"#;
const DO_NEXT: &str = r#"tell application "Spotify" to next track"#;
const GET_STATE: &str = r#"tell application "Spotify" to player state as string"#;
const GET_POSITION: &str = r#"tell application "Spotify" to player position as string"#;
const GET_LENGTH: &str =
    r#"tell application "Spotify" to (duration of current track / 1000) as string"#;
const GET_REMAINING: &str = r#"tell application "Spotify" to ((duration of current track / 1000) - (player position)) as string"#;
const GET_VOLUME: &str = r#"tell application "Spotify" to sound volume as integer"#;

fn do_play(uri: &str) -> String {
    format!(r#"tell application "Spotify" to play track "{uri}""#)
}

fn do_volume(value: u8) -> String {
    format!(r#"tell application "Spotify" to set sound volume to {value}"#)
}

pub struct AppleScriptPlayer {
    timeout: Duration,
}

impl AppleScriptPlayer {
    pub fn new() -> Self {
        Self {
            timeout: COMMAND_TIMEOUT,
        }
    }

    async fn run(&self, script: &str) -> Option<String> {
        let invocation = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, invocation).await {
            Ok(Ok(output)) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            }
            Ok(Ok(output)) => {
                tracing::debug!(script, code = ?output.status.code(), "osascript failed");
                None
            }
            Ok(Err(e)) => {
                tracing::debug!(script, error = %e, "osascript did not run");
                None
            }
            Err(_) => {
                tracing::debug!(script, "osascript timed out");
                None
            }
        }
    }

    async fn run_number(&self, script: &str) -> Option<f64> {
        let raw = self.run(script).await?;
        raw.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl Default for AppleScriptPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerControlPort for AppleScriptPlayer {
    async fn play(&self, uri: &str) -> bool {
        tracing::debug!(uri, "player: play");
        self.run(&do_play(uri)).await.is_some()
    }

    async fn pause(&self) -> bool {
        // playpause is a toggle; only send it when actually playing
        if self.state().await != Some(PlayerState::Playing) {
            return false;
        }
        self.run(DO_PLAYPAUSE).await.is_some()
    }

    async fn resume(&self) -> bool {
        if self.state().await == Some(PlayerState::Playing) {
            return false;
        }
        self.run(DO_PLAYPAUSE).await.is_some()
    }

    async fn skip_native(&self) -> bool {
        tracing::debug!("player: next track");
        self.run(DO_NEXT).await.is_some()
    }

    async fn state(&self) -> Option<PlayerState> {
        let raw = self.run(GET_STATE).await?;
        PlayerState::parse(&raw)
    }

    async fn position(&self) -> Option<f64> {
        self.run_number(GET_POSITION).await
    }

    async fn length(&self) -> Option<f64> {
        self.run_number(GET_LENGTH).await
    }

    async fn remaining(&self) -> Option<f64> {
        self.run_number(GET_REMAINING).await
    }

    async fn volume(&self) -> Option<u8> {
        let raw = self.run(GET_VOLUME).await?;
        let value = raw.parse::<i64>().ok()?.clamp(0, 100) as u8;
        // the app reports values one off from what was set; snap to the
        // step grid so up/down arithmetic stays stable
        Some(quantize_volume(value))
    }

    async fn set_volume(&self, value: u8) -> Option<u8> {
        let effective = quantize_volume(value.min(100));
        tracing::debug!(requested = value, effective, "player: set volume");
        self.run(&do_volume(effective)).await?;
        Some(effective)
    }
}
