//! Error types for jukebox operations

use thiserror::Error;

/// Failures surfaced by the jukebox's public operations.
///
/// None of these are fatal: every variant renders as a plain
/// "couldn't do that" at the chat boundary, and transient poll-sample
/// hiccups never reach this type at all.
#[derive(Error, Debug)]
pub enum JukeboxError {
    /// Identifier not present in the catalog
    #[error("no playable with id `{0}`")]
    NotFound(String),

    /// Member-track lookup for an album/playlist failed
    #[error("could not expand `{id}`")]
    Expansion {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// Catalog search against the provider failed
    #[error("catalog search failed")]
    Search(#[source] anyhow::Error),

    /// The control surface refused or timed out on a playback command
    #[error("player rejected `{0}`")]
    ControlSurface(&'static str),
}
