//! Player identity and roster records.
//!
//! A [`PlayerId`] is the game server's client slot number. It is stable for
//! the lifetime of a player's session and carries no data of its own;
//! everything else the engine knows about a player comes from the roster
//! ([`PlayerInfo`]) or from the stat store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A per-session player identifier (the game's client slot number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Create a player id from a raw slot number.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw slot number.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team membership as reported by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    /// Not yet known (e.g. still connecting).
    #[default]
    Unknown,
    /// Free-for-all: everybody is an opponent.
    Free,
    /// Watching, not playing.
    Spectator,
    Red,
    Blue,
}

impl Team {
    /// Returns `true` for the two sides of a team game.
    #[must_use]
    pub const fn is_playing_side(self) -> bool {
        matches!(self, Team::Red | Team::Blue)
    }

    /// Two players are teammates only when both are on the same playing side.
    #[must_use]
    pub fn is_teammate_of(self, other: Team) -> bool {
        self.is_playing_side() && self == other
    }
}

/// What the roster knows about a connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// The player's slot number.
    pub id: PlayerId,
    /// Display name, possibly containing `^N` colour codes.
    pub name: String,
    /// Highest access level of any group the player belongs to.
    pub level: i32,
    /// Current team.
    pub team: Team,
}

impl PlayerInfo {
    /// Create a roster record.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, level: i32, team: Team) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            team,
        }
    }

    /// The name with colour codes and whitespace removed, lowercased.
    ///
    /// This is the form used when matching a player against a typed query.
    #[must_use]
    pub fn search_key(&self) -> String {
        search_key(&self.name)
    }
}

/// Normalise a name or query for case-, colour- and whitespace-insensitive
/// matching.
///
/// `^` followed by any character is a colour code and is dropped with that
/// character.
#[must_use]
pub fn search_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '^' {
            chars.next();
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        out.extend(c.to_lowercase());
    }
    out
}
