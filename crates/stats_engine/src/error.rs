//! Engine error types.

use stats_core::{EventError, PlayerId};

/// Failures reading or writing a player's stat entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A handler panicked while holding this player's entry; its contents can
    /// no longer be trusted.
    #[error("stat entry for player {0} is poisoned")]
    Poisoned(PlayerId),
}

/// Failures processing a single event.
///
/// An error rejects the event that caused it. Later events are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The raw event could not be converted.
    #[error("invalid event: {0}")]
    Event(#[from] EventError),

    /// A player's stat entry could not be accessed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rejections from the player-facing query surface.
///
/// The `Display` text is what the requesting player is shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("You must supply a player name to test")]
    MissingTarget,

    #[error("No players found matching {0}")]
    NotFound(String),

    #[error("Players matching {query}: {}", .candidates.join(", "))]
    Ambiguous {
        /// What the caller typed.
        query: String,
        /// Names of every matching player.
        candidates: Vec<String>,
    },

    /// The caller is not on the roster.
    #[error("Player {0} is not connected")]
    UnknownCaller(PlayerId),

    #[error("You don't get points for killing yourself")]
    SelfTarget,

    #[error("You don't get points for killing a team mate")]
    SameTeam,

    #[error("Stats unavailable: {0}")]
    Store(#[from] StoreError),
}
