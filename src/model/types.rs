//! Core type definitions for the jukebox

/// What kind of catalog entry a `Playable` refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayableKind {
    Track,
    Album,
    Playlist,
}

impl PlayableKind {
    /// Single-letter tag used when minting session ids.
    pub fn letter(self) -> char {
        match self {
            PlayableKind::Track => 't',
            PlayableKind::Album => 'a',
            PlayableKind::Playlist => 'p',
        }
    }

    /// Albums and playlists must be expanded into tracks before queueing.
    pub fn is_composite(self) -> bool {
        !matches!(self, PlayableKind::Track)
    }
}

/// A resolved catalog entry, addressable by its session-scoped id.
///
/// Ids are unique for the lifetime of the process but carry no meaning
/// outside it; `uri` is what the control surface accepts, `service_id`
/// is what the provider accepts for member lookups.
#[derive(Clone, Debug)]
pub struct Playable {
    pub id: String,
    pub name: String,
    /// Joined display string of contributing artists
    pub artists: String,
    pub kind: PlayableKind,
    pub uri: String,
    pub service_id: String,
    /// 1 for a track; total member tracks for a composite, 0 when the
    /// provider does not report it
    pub member_count: u32,
}

/// Raw metadata as returned by the catalog provider, before the catalog
/// assigns it a session id.
#[derive(Clone, Debug)]
pub struct RawPlayable {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub artists: Vec<String>,
    pub kind: PlayableKind,
    pub member_count: u32,
}

/// One search call's raw results, by category.
#[derive(Clone, Debug, Default)]
pub struct RawSearchResults {
    pub tracks: Vec<RawPlayable>,
    pub albums: Vec<RawPlayable>,
    pub playlists: Vec<RawPlayable>,
}

/// Categorized, catalog-registered results of a search. All three
/// categories are always present, possibly empty, so callers can render
/// "no X found" instead of dropping the section.
#[derive(Clone, Debug, Default)]
pub struct SearchListing {
    pub tracks: Vec<Playable>,
    pub albums: Vec<Playable>,
    pub playlists: Vec<Playable>,
}

/// Player state as reported by the control surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

impl PlayerState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "playing" => Some(PlayerState::Playing),
            "paused" => Some(PlayerState::Paused),
            "stopped" => Some(PlayerState::Stopped),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Stopped => "stopped",
        }
    }
}

/// Snapshot of what the jukebox intends to play and what the player
/// reports. The name/artist fields reflect intent (the last successful
/// play call); `state` is what the control surface actually says.
#[derive(Clone, Debug)]
pub struct JukeboxStatus {
    pub now_playing_name: Option<String>,
    pub now_playing_artist: Option<String>,
    pub position: Option<f64>,
    pub length: Option<f64>,
    pub state: Option<PlayerState>,
    pub volume: Option<u8>,
    pub queue: Vec<Playable>,
}
