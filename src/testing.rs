//! Shared fakes for exercising the jukebox without a player or network

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::model::{
    PlayableKind, PlayableProvider, PlayerState, RawPlayable, RawSearchResults,
};
use crate::player::{quantize_volume, PlayerControlPort};

pub fn raw_track(id: &str, name: &str) -> RawPlayable {
    RawPlayable {
        id: id.to_string(),
        name: name.to_string(),
        uri: format!("spotify:track:{id}"),
        artists: vec!["Fake Artist".to_string()],
        kind: PlayableKind::Track,
        member_count: 1,
    }
}

pub fn raw_album(id: &str, name: &str, member_count: u32) -> RawPlayable {
    RawPlayable {
        id: id.to_string(),
        name: name.to_string(),
        uri: format!("spotify:album:{id}"),
        artists: vec!["Fake Artist".to_string()],
        kind: PlayableKind::Album,
        member_count,
    }
}

pub fn raw_playlist(id: &str, name: &str, member_count: u32) -> RawPlayable {
    RawPlayable {
        id: id.to_string(),
        name: name.to_string(),
        uri: format!("spotify:playlist:{id}"),
        artists: vec!["Fake Curator".to_string()],
        kind: PlayableKind::Playlist,
        member_count,
    }
}

/// Provider that serves canned results for any search term. Member
/// lookups for ids it was not told about fail, which is how expansion
/// failures are provoked in tests.
#[derive(Default)]
pub struct FakeProvider {
    results: RawSearchResults,
    album_members: HashMap<String, Vec<RawPlayable>>,
    playlist_members: HashMap<String, Vec<RawPlayable>>,
}

impl FakeProvider {
    pub fn with_tracks(mut self, tracks: Vec<RawPlayable>) -> Self {
        self.results.tracks = tracks;
        self
    }

    pub fn with_albums(mut self, albums: Vec<RawPlayable>) -> Self {
        self.results.albums = albums;
        self
    }

    pub fn with_playlists(mut self, playlists: Vec<RawPlayable>) -> Self {
        self.results.playlists = playlists;
        self
    }

    pub fn with_album_members(mut self, id: &str, members: Vec<RawPlayable>) -> Self {
        self.album_members.insert(id.to_string(), members);
        self
    }

    pub fn with_playlist_members(mut self, id: &str, members: Vec<RawPlayable>) -> Self {
        self.playlist_members.insert(id.to_string(), members);
        self
    }
}

#[async_trait]
impl PlayableProvider for FakeProvider {
    async fn search_catalog(&self, _term: &str) -> Result<RawSearchResults> {
        Ok(self.results.clone())
    }

    async fn fetch_album_members(&self, id: &str) -> Result<Vec<RawPlayable>> {
        self.album_members
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("album `{id}` unavailable"))
    }

    async fn fetch_playlist_members(&self, id: &str) -> Result<Vec<RawPlayable>> {
        self.playlist_members
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("playlist `{id}` unavailable"))
    }
}

#[derive(Debug, Default)]
struct FakePlayerState {
    state: Option<PlayerState>,
    volume: u8,
    position: Option<f64>,
    length: Option<f64>,
    remaining: Option<f64>,
    /// What `remaining` becomes right after a successful play call,
    /// mimicking a fresh track starting
    remaining_after_play: Option<f64>,
    reject_play: bool,
    play_calls: Vec<String>,
    set_volume_calls: Vec<u8>,
    native_skips: u32,
}

/// In-memory control surface with call recording.
#[derive(Default)]
pub struct FakePlayer {
    state: Mutex<FakePlayerState>,
}

impl FakePlayer {
    pub fn playing() -> Self {
        let player = Self::default();
        player.state.lock().unwrap().state = Some(PlayerState::Playing);
        player.state.lock().unwrap().volume = 50;
        player
    }

    pub fn stopped() -> Self {
        let player = Self::default();
        player.state.lock().unwrap().state = Some(PlayerState::Stopped);
        player.state.lock().unwrap().volume = 50;
        player
    }

    pub fn set_remaining(&self, remaining: Option<f64>) {
        self.state.lock().unwrap().remaining = remaining;
    }

    pub fn set_current_volume(&self, volume: u8) {
        self.state.lock().unwrap().volume = volume;
    }

    pub fn reject_play(&self, reject: bool) {
        self.state.lock().unwrap().reject_play = reject;
    }

    pub fn play_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().play_calls.clone()
    }

    pub fn set_volume_calls(&self) -> Vec<u8> {
        self.state.lock().unwrap().set_volume_calls.clone()
    }

    pub fn native_skips(&self) -> u32 {
        self.state.lock().unwrap().native_skips
    }
}

#[async_trait]
impl PlayerControlPort for FakePlayer {
    async fn play(&self, uri: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.reject_play {
            return false;
        }
        state.play_calls.push(uri.to_string());
        state.state = Some(PlayerState::Playing);
        state.remaining = state.remaining_after_play;
        true
    }

    async fn pause(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.state == Some(PlayerState::Playing) {
            state.state = Some(PlayerState::Paused);
            true
        } else {
            false
        }
    }

    async fn resume(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.state == Some(PlayerState::Playing) {
            false
        } else {
            state.state = Some(PlayerState::Playing);
            true
        }
    }

    async fn skip_native(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        state.native_skips += 1;
        state.state = Some(PlayerState::Playing);
        true
    }

    async fn state(&self) -> Option<PlayerState> {
        self.state.lock().unwrap().state
    }

    async fn position(&self) -> Option<f64> {
        self.state.lock().unwrap().position
    }

    async fn length(&self) -> Option<f64> {
        self.state.lock().unwrap().length
    }

    async fn remaining(&self) -> Option<f64> {
        self.state.lock().unwrap().remaining
    }

    async fn volume(&self) -> Option<u8> {
        Some(self.state.lock().unwrap().volume)
    }

    async fn set_volume(&self, value: u8) -> Option<u8> {
        let mut state = self.state.lock().unwrap();
        let effective = quantize_volume(value);
        state.set_volume_calls.push(value);
        state.volume = effective;
        Some(effective)
    }
}
