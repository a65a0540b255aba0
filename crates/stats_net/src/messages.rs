//! Message types exchanged with the game server and stat clients.
//!
//! Events come in as [`RawEvent`](stats_core::RawEvent) on the events
//! subject and are not redefined here.

use serde::{Deserialize, Serialize};
use stats_core::{PlayerId, PlayerInfo, Team};

pub use stats_core::Announcement;

// ── Roster ──────────────────────────────────────────────────────────────────

/// A change to the set of connected players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterUpdate {
    /// A player connected or their record changed.
    Joined(PlayerInfo),
    /// A player disconnected. Their stats are discarded.
    Left(PlayerId),
    TeamChanged { player: PlayerId, team: Team },
}

// ── Queries ─────────────────────────────────────────────────────────────────

/// A player-issued stats query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The player asking.
    pub caller: PlayerId,
    /// The player asked about, as typed.
    #[serde(default)]
    pub target: Option<String>,
    /// Leaderboard length; the configured default when absent.
    #[serde(default)]
    pub count: Option<usize>,
}

impl QueryRequest {
    #[must_use]
    pub fn new(caller: PlayerId) -> Self {
        Self {
            caller,
            target: None,
            count: None,
        }
    }

    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// The answer to a [`QueryRequest`]. Exactly one side is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryReply {
    #[must_use]
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            ok: Some(text.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            ok: None,
            error: Some(text.into()),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok.is_some()
    }
}

// ── Service ─────────────────────────────────────────────────────────────────

/// Published once when a stats service comes up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Unique identifier of this service process.
    pub instance_id: String,
    /// The subject prefix it serves.
    pub prefix: String,
    /// Connected players known at startup.
    pub players: usize,
}
