//! Session catalog: id assignment and lookup caching
//!
//! Every `Playable` ever handed to a caller is retained here, keyed by
//! its session id, so a later command referencing that id still
//! resolves. Ids are minted from monotonic counters and are never
//! reused within a process.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::JukeboxError;

use super::provider::PlayableProvider;
use super::types::{Playable, PlayableKind, RawPlayable, SearchListing};

pub struct PlayableCatalog {
    provider: Arc<dyn PlayableProvider>,
    entries: HashMap<String, Playable>,
    search_count: u64,
    expansion_count: u64,
}

impl PlayableCatalog {
    pub fn new(provider: Arc<dyn PlayableProvider>) -> Self {
        Self {
            provider,
            entries: HashMap::new(),
            search_count: 0,
            expansion_count: 0,
        }
    }

    /// Run a catalog search and register every result under a fresh
    /// session id of the form `<search#><kind-letter><position>`.
    pub async fn search(&mut self, term: &str) -> Result<SearchListing, JukeboxError> {
        self.search_count += 1;
        let raw = self
            .provider
            .search_catalog(term)
            .await
            .map_err(JukeboxError::Search)?;

        Ok(SearchListing {
            tracks: self.register_search(raw.tracks),
            albums: self.register_search(raw.albums),
            playlists: self.register_search(raw.playlists),
        })
    }

    fn register_search(&mut self, raws: Vec<RawPlayable>) -> Vec<Playable> {
        let session = self.search_count;
        raws.into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let id = format!("{session}{}{}", raw.kind.letter(), i + 1);
                self.store(id, raw)
            })
            .collect()
    }

    fn store(&mut self, id: String, raw: RawPlayable) -> Playable {
        let playable = Playable {
            id: id.clone(),
            name: raw.name,
            artists: raw.artists.join(", "),
            kind: raw.kind,
            uri: raw.uri,
            service_id: raw.id,
            member_count: raw.member_count,
        };
        self.entries.insert(id, playable.clone());
        playable
    }

    /// Resolve an id to an ordered sequence of playable tracks.
    ///
    /// A track resolves to itself. An album or playlist is fetched from
    /// the provider and its members minted as fresh entries under an
    /// `x<expansion#>t<position>` id, so repeated expansions of the same
    /// composite never collide with each other or with search results.
    pub async fn expand(&mut self, id: &str) -> Result<Vec<Playable>, JukeboxError> {
        let playable = self
            .resolve(id)
            .ok_or_else(|| JukeboxError::NotFound(id.to_string()))?;

        let members = match playable.kind {
            PlayableKind::Track => return Ok(vec![playable]),
            PlayableKind::Album => self.provider.fetch_album_members(&playable.service_id).await,
            PlayableKind::Playlist => {
                self.provider
                    .fetch_playlist_members(&playable.service_id)
                    .await
            }
        };
        let members = members.map_err(|source| JukeboxError::Expansion {
            id: id.to_string(),
            source,
        })?;
        if members.is_empty() {
            return Err(JukeboxError::Expansion {
                id: id.to_string(),
                source: anyhow::anyhow!("no member tracks"),
            });
        }

        self.expansion_count += 1;
        let expansion = self.expansion_count;
        tracing::debug!(id, members = members.len(), "expanded composite");

        Ok(members
            .into_iter()
            .enumerate()
            .map(|(i, raw)| self.store(format!("x{expansion}t{}", i + 1), raw))
            .collect())
    }

    /// Pure lookup; no side effects.
    pub fn resolve(&self, id: &str) -> Option<Playable> {
        self.entries.get(id).cloned()
    }

    /// Drop every cached entry. Counters keep counting so old ids are
    /// never reissued to new entries.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
