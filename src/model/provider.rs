//! Spotify Web API catalog provider
//!
//! Only catalog lookups live here: search, album tracks, playlist
//! tracks. Playback never goes through the Web API; that is the control
//! surface's job.

use anyhow::Result;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use rspotify::{
    model::{
        AlbumId, FullTrack, Market, PlayableItem, PlaylistId, SearchResult, SearchType,
        SimplifiedAlbum, SimplifiedPlaylist, SimplifiedTrack,
    },
    prelude::*,
    ClientCredsSpotify, Config, Credentials,
};

use super::types::{PlayableKind, RawPlayable, RawSearchResults};

/// Results fetched per category per search call
const SEARCH_LIMIT: u32 = 10;

/// Member tracks fetched for a playlist expansion
const PLAYLIST_PAGE_SIZE: usize = 100;

/// Catalog lookups the jukebox needs from a music service.
#[async_trait]
pub trait PlayableProvider: Send + Sync {
    async fn search_catalog(&self, term: &str) -> Result<RawSearchResults>;
    async fn fetch_album_members(&self, id: &str) -> Result<Vec<RawPlayable>>;
    async fn fetch_playlist_members(&self, id: &str) -> Result<Vec<RawPlayable>>;
}

/// Provider backed by the Spotify Web API, client-credentials flow.
pub struct SpotifyProvider {
    client: ClientCredsSpotify,
}

impl SpotifyProvider {
    /// Exchange app credentials for an access token. Token refresh is
    /// handled by the client from here on.
    pub async fn connect(client_id: &str, client_secret: &str) -> Result<Self> {
        let creds = Credentials::new(client_id, client_secret);
        let config = Config {
            token_refreshing: true,
            ..Default::default()
        };
        let client = ClientCredsSpotify::with_config(creds, config);
        client.request_token().await?;
        tracing::info!("Spotify catalog credentials accepted");
        Ok(Self { client })
    }

    fn raw_from_full_track(track: &FullTrack) -> RawPlayable {
        let track_id = track
            .id
            .as_ref()
            .map(|id| id.id().to_string())
            .unwrap_or_default();
        RawPlayable {
            uri: format!("spotify:track:{}", track_id),
            id: track_id,
            name: track.name.clone(),
            artists: track.artists.iter().map(|a| a.name.clone()).collect(),
            kind: PlayableKind::Track,
            member_count: 1,
        }
    }

    fn raw_from_simplified_track(track: &SimplifiedTrack) -> RawPlayable {
        let track_id = track
            .id
            .as_ref()
            .map(|id| id.id().to_string())
            .unwrap_or_default();
        RawPlayable {
            uri: format!("spotify:track:{}", track_id),
            id: track_id,
            name: track.name.clone(),
            artists: track.artists.iter().map(|a| a.name.clone()).collect(),
            kind: PlayableKind::Track,
            member_count: 1,
        }
    }

    fn raw_from_album(album: &SimplifiedAlbum) -> RawPlayable {
        let album_id = album
            .id
            .as_ref()
            .map(|id| id.id().to_string())
            .unwrap_or_default();
        RawPlayable {
            uri: format!("spotify:album:{}", album_id),
            id: album_id,
            name: album.name.clone(),
            artists: album.artists.iter().map(|a| a.name.clone()).collect(),
            kind: PlayableKind::Album,
            // search results do not carry a track total for albums
            member_count: 0,
        }
    }

    fn raw_from_playlist(playlist: &SimplifiedPlaylist) -> RawPlayable {
        let playlist_id = playlist.id.id().to_string();
        let owner = playlist
            .owner
            .display_name
            .clone()
            .unwrap_or_else(|| playlist.owner.id.id().to_string());
        RawPlayable {
            uri: format!("spotify:playlist:{}", playlist_id),
            id: playlist_id,
            name: playlist.name.clone(),
            artists: vec![owner],
            kind: PlayableKind::Playlist,
            member_count: playlist.tracks.total,
        }
    }
}

#[async_trait]
impl PlayableProvider for SpotifyProvider {
    async fn search_catalog(&self, term: &str) -> Result<RawSearchResults> {
        let market: Option<Market> = None;
        let mut results = RawSearchResults::default();

        // All three categories in parallel; a failed category just comes
        // back empty rather than sinking the whole search
        let (track_result, album_result, playlist_result) = futures::join!(
            self.client
                .search(term, SearchType::Track, market, None, Some(SEARCH_LIMIT), None),
            self.client
                .search(term, SearchType::Album, market, None, Some(SEARCH_LIMIT), None),
            self.client
                .search(term, SearchType::Playlist, market, None, Some(SEARCH_LIMIT), None),
        );

        if let Ok(SearchResult::Tracks(page)) = track_result {
            for track in page.items {
                results.tracks.push(Self::raw_from_full_track(&track));
            }
        }

        if let Ok(SearchResult::Albums(page)) = album_result {
            for album in page.items {
                results.albums.push(Self::raw_from_album(&album));
            }
        }

        if let Ok(SearchResult::Playlists(page)) = playlist_result {
            for playlist in page.items {
                results.playlists.push(Self::raw_from_playlist(&playlist));
            }
        }

        tracing::debug!(
            term,
            tracks = results.tracks.len(),
            albums = results.albums.len(),
            playlists = results.playlists.len(),
            "catalog search complete"
        );

        Ok(results)
    }

    async fn fetch_album_members(&self, id: &str) -> Result<Vec<RawPlayable>> {
        let album_id = AlbumId::from_id(id)?;
        tracing::debug!(id, "API: album tracks");
        let album = self.client.album(album_id, None).await?;

        Ok(album
            .tracks
            .items
            .iter()
            .map(Self::raw_from_simplified_track)
            .collect())
    }

    async fn fetch_playlist_members(&self, id: &str) -> Result<Vec<RawPlayable>> {
        let playlist_id = PlaylistId::from_id(id)?;
        tracing::debug!(id, "API: playlist tracks");

        let items: Vec<_> = self
            .client
            .playlist_items(playlist_id, None, None)
            .take(PLAYLIST_PAGE_SIZE)
            .try_collect()
            .await?;

        let mut tracks = Vec::new();
        for item in items {
            if let Some(PlayableItem::Track(track)) = item.track {
                tracks.push(Self::raw_from_full_track(&track));
            }
        }
        Ok(tracks)
    }
}
