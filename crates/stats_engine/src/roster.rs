//! Roster of connected players.
//!
//! The engine never reaches for a global player list. Everything that walks
//! "all players" (round resets, leaderboards, name lookups) takes a
//! [`Roster`], so tests can hand in a synthetic one.

use dashmap::DashMap;
use stats_core::player::search_key;
use stats_core::{PlayerId, PlayerInfo, Team};

/// Read access to the set of connected players.
pub trait Roster: Send + Sync {
    /// Every connected player, ordered by id.
    fn players(&self) -> Vec<PlayerInfo>;

    /// One player by id.
    fn get(&self, id: PlayerId) -> Option<PlayerInfo>;

    /// Players matching a typed query.
    ///
    /// `@<id>` or a bare number selects by id when such a player is
    /// connected. Otherwise the query is compared against names ignoring
    /// case, whitespace and colour codes: exact matches win, then substring
    /// matches.
    fn find(&self, query: &str) -> Vec<PlayerInfo> {
        let trimmed = query.trim();
        let id_text = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if let Ok(raw) = id_text.parse::<u32>()
            && let Some(info) = self.get(PlayerId(raw))
        {
            return vec![info];
        }

        let key = search_key(trimmed);
        if key.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<(String, PlayerInfo)> = self
            .players()
            .into_iter()
            .map(|p| (p.search_key(), p))
            .filter(|(name, _)| name.contains(&key))
            .collect();

        if candidates.iter().any(|(name, _)| *name == key) {
            return candidates
                .into_iter()
                .filter(|(name, _)| *name == key)
                .map(|(_, p)| p)
                .collect();
        }
        candidates.into_iter().map(|(_, p)| p).collect()
    }
}

/// The in-process roster, fed by the game's connect/disconnect/team events.
#[derive(Debug, Default)]
pub struct SessionRoster {
    players: DashMap<PlayerId, PlayerInfo>,
}

impl SessionRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
        }
    }

    /// Add or replace a player.
    pub fn join(&self, info: PlayerInfo) {
        self.players.insert(info.id, info);
    }

    /// Remove a player. Returns the record if the player was connected.
    pub fn leave(&self, id: PlayerId) -> Option<PlayerInfo> {
        self.players.remove(&id).map(|(_, info)| info)
    }

    /// Update a player's team. Returns `false` if the player is unknown.
    pub fn set_team(&self, id: PlayerId, team: Team) -> bool {
        match self.players.get_mut(&id) {
            Some(mut info) => {
                info.team = team;
                true
            }
            None => false,
        }
    }

    /// Number of connected players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Roster for SessionRoster {
    fn players(&self) -> Vec<PlayerInfo> {
        let mut players: Vec<PlayerInfo> = self.players.iter().map(|p| p.value().clone()).collect();
        players.sort_by_key(|p| p.id);
        players
    }

    fn get(&self, id: PlayerId) -> Option<PlayerInfo> {
        self.players.get(&id).map(|p| p.value().clone())
    }
}

impl FromIterator<PlayerInfo> for SessionRoster {
    fn from_iter<I: IntoIterator<Item = PlayerInfo>>(iter: I) -> Self {
        let roster = Self::new();
        for info in iter {
            roster.join(info);
        }
        roster
    }
}
