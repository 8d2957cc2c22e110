//! Data model: playables, the session catalog, and the catalog provider
//!
//! - `types`: core type definitions
//! - `catalog`: session-scoped id assignment and result caching
//! - `provider`: the external catalog boundary and its Spotify impl

mod catalog;
mod provider;
mod types;

pub use catalog::PlayableCatalog;
pub use provider::{PlayableProvider, SpotifyProvider};
pub use types::{
    JukeboxStatus, Playable, PlayableKind, PlayerState, RawPlayable, RawSearchResults,
    SearchListing,
};
