//! Control-surface boundary
//!
//! The narrow capability the jukebox needs from the actual player:
//! imperative commands plus pollable status, no push events.

mod applescript;

pub use applescript::AppleScriptPlayer;

use async_trait::async_trait;

use crate::model::PlayerState;

/// The desktop player applies volume in steps of this size.
pub const VOLUME_STEP: u8 = 10;

/// Every call may fail or hang; implementations bound each call and
/// report a timeout as a missing/failed result rather than an error.
#[async_trait]
pub trait PlayerControlPort: Send + Sync {
    async fn play(&self, uri: &str) -> bool;
    /// false when already paused/stopped
    async fn pause(&self) -> bool;
    /// false when already playing
    async fn resume(&self) -> bool;
    async fn skip_native(&self) -> bool;
    async fn state(&self) -> Option<PlayerState>;
    async fn position(&self) -> Option<f64>;
    async fn length(&self) -> Option<f64>;
    async fn remaining(&self) -> Option<f64>;
    async fn volume(&self) -> Option<u8>;
    /// Returns the effective applied value, which may be quantized.
    async fn set_volume(&self, value: u8) -> Option<u8>;
}

/// Round a requested volume up to the player's nearest step, capped at
/// 100. Callers must trust the result, not their request.
pub fn quantize_volume(value: u8) -> u8 {
    ((value as u16).div_ceil(VOLUME_STEP as u16) * VOLUME_STEP as u16).min(100) as u8
}
