//! Ranked views over one metric.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use stats_core::{Metric, PlayerId, round2};
use tracing::warn;

use crate::roster::Roster;
use crate::store::StatStore;

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub player: PlayerId,
    pub name: String,
    /// Metric value, rounded to 2 decimals.
    pub value: f64,
}

/// The top `n` roster players by `metric`.
///
/// Only players for whom `metric` has been materialized are ranked. Values
/// are rounded before sorting; equal values keep ascending player id order.
/// Unreadable entries are logged and left out.
pub fn top_n(store: &StatStore, roster: &dyn Roster, metric: Metric, n: usize) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(PlayerId, String, f64)> = Vec::new();

    for player in roster.players() {
        let stats = match store.snapshot(player.id) {
            Ok(Some(stats)) => stats,
            Ok(None) => continue,
            Err(e) => {
                warn!(player = %player.id, %e, "skipping player in leaderboard");
                continue;
            }
        };
        if !stats.is_touched(metric) {
            continue;
        }
        rows.push((player.id, player.name, round2(stats.value(metric))));
    }

    rows.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    rows.into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (player, name, value))| LeaderboardEntry {
            rank: i + 1,
            player,
            name,
            value,
        })
        .collect()
}

// ── Rendered boards ─────────────────────────────────────────────────────────

/// The two boards players can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    /// Ranked by skill rating.
    Skill,
    /// Ranked by current-round experience.
    Experience,
}

impl Board {
    #[must_use]
    pub const fn metric(self) -> Metric {
        match self {
            Board::Skill => Metric::Points,
            Board::Experience => Metric::Experience,
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Board::Skill => "Top Stats",
            Board::Experience => "Top Experienced Players",
        }
    }

    const fn empty_line(self) -> &'static str {
        match self {
            Board::Skill => "No top players",
            Board::Experience => "No top experienced players",
        }
    }
}

/// A leaderboard ready to be shown in chat.
#[derive(Debug, Clone, PartialEq)]
pub struct TopList {
    pub board: Board,
    pub entries: Vec<LeaderboardEntry>,
}

impl TopList {
    /// Build the `board` from the current store and roster.
    #[must_use]
    pub fn build(store: &StatStore, roster: &dyn Roster, board: Board, n: usize) -> Self {
        Self {
            board,
            entries: top_n(store, roster, board.metric(), n),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for TopList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "^3Stats: ^7{}", self.board.empty_line());
        }
        write!(f, "^3{}:^7 ", self.board.title())?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "^3#{}^7 {} ^7[^3{}^7]", entry.rank, entry.name, entry.value)?;
        }
        Ok(())
    }
}
