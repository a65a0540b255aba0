//! Player-facing stat queries.
//!
//! Everything here reads through [`StatStore::snapshot`], so asking about a
//! player never materializes a metric for them.

use std::fmt;

use serde::{Deserialize, Serialize};
use stats_core::{PlayerId, PlayerInfo, PlayerStats, round2, score};

use crate::error::QueryError;
use crate::leaderboard::{Board, TopList};
use crate::reactor::StatsEngine;
use crate::roster::Roster;

/// A player's stats for the current map, as shown by the stats command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub player: PlayerId,
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub team_kills: u32,
    pub damage: u64,
    /// Skill rating, rounded to 2 decimals.
    pub rating: f64,
    /// Experience over the whole map session, rounded to 2 decimals.
    pub experience: f64,
}

impl fmt::Display for StatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "^3Stats ^7[ {} ^7] K ^2{} ^7D ^3{} ^7A ^5{} ^7TK ^1{} ^7Dmg ^5{} ^7Skill ^3{:.2} ^7XP ^6{}",
            self.name,
            self.kills,
            self.deaths,
            self.assists,
            self.team_kills,
            self.damage,
            self.rating,
            self.experience,
        )
    }
}

/// What killing a player would be worth right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillPreview {
    pub attacker: String,
    pub target: String,
    pub value: f64,
}

impl fmt::Display for KillPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "^3Stats: ^7{}^7 will get ^3{} ^7skill points for killing {}^7",
            self.attacker, self.value, self.target
        )
    }
}

/// Read-only queries over a [`StatsEngine`].
#[derive(Debug)]
pub struct StatsQueries<'a, R: Roster> {
    engine: &'a StatsEngine<R>,
}

impl<R: Roster> StatsEngine<R> {
    /// The query surface of this engine.
    #[must_use]
    pub fn queries(&self) -> StatsQueries<'_, R> {
        StatsQueries { engine: self }
    }
}

impl<'a, R: Roster> StatsQueries<'a, R> {
    /// Stats of the player matching `target`, or of the caller when no
    /// target is given.
    ///
    /// # Errors
    ///
    /// Fails if the caller is not connected, the target does not resolve to
    /// exactly one player, or the entry is poisoned.
    pub fn summary(&self, caller: PlayerId, target: Option<&str>) -> Result<StatSummary, QueryError> {
        let player = match target.map(str::trim).filter(|t| !t.is_empty()) {
            Some(query) => self.resolve(query)?,
            None => self.caller(caller)?,
        };
        let stats = self.stats_of(player.id)?;

        Ok(StatSummary {
            player: player.id,
            name: player.name,
            kills: stats.kills(),
            deaths: stats.deaths(),
            assists: stats.assists(),
            team_kills: stats.team_kills(),
            damage: stats.damage_hit(),
            rating: round2(stats.points()),
            experience: round2(stats.total_experience()),
        })
    }

    /// Skill points `attacker` would earn for killing the player matching
    /// `target`. Nothing is changed.
    ///
    /// # Errors
    ///
    /// See [`preview_kill`](Self::preview_kill).
    pub fn preview_kill_value(&self, attacker: PlayerId, target: &str) -> Result<f64, QueryError> {
        self.preview_kill(attacker, target).map(|preview| preview.value)
    }

    /// Like [`preview_kill_value`](Self::preview_kill_value), with both
    /// players' names for display.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MissingTarget`] for an empty target,
    /// [`QueryError::SelfTarget`] when the target is the attacker, and
    /// [`QueryError::SameTeam`] when both are on the same playing side.
    pub fn preview_kill(&self, attacker: PlayerId, target: &str) -> Result<KillPreview, QueryError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(QueryError::MissingTarget);
        }
        let attacker = self.caller(attacker)?;
        let victim = self.resolve(target)?;

        if victim.id == attacker.id {
            return Err(QueryError::SelfTarget);
        }
        if victim.team.is_teammate_of(attacker.team) {
            return Err(QueryError::SameTeam);
        }

        let value = score(
            self.stats_of(attacker.id)?.points(),
            self.stats_of(victim.id)?.points(),
        );
        Ok(KillPreview {
            attacker: attacker.name,
            target: victim.name,
            value,
        })
    }

    /// The best `n` players by skill rating.
    #[must_use]
    pub fn top_skill(&self, n: usize) -> TopList {
        self.top(Board::Skill, n)
    }

    /// The best `n` players by current-round experience.
    #[must_use]
    pub fn top_experience(&self, n: usize) -> TopList {
        self.top(Board::Experience, n)
    }

    fn top(&self, board: Board, n: usize) -> TopList {
        TopList::build(self.engine.store(), self.engine.roster(), board, n)
    }

    /// Resolve a typed query to exactly one connected player.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] or [`QueryError::Ambiguous`].
    pub fn resolve(&self, query: &str) -> Result<PlayerInfo, QueryError> {
        let mut found = self.engine.roster().find(query);
        match found.len() {
            0 => Err(QueryError::NotFound(query.to_string())),
            1 => Ok(found.remove(0)),
            _ => Err(QueryError::Ambiguous {
                query: query.to_string(),
                candidates: found.into_iter().map(|p| p.name).collect(),
            }),
        }
    }

    fn caller(&self, id: PlayerId) -> Result<PlayerInfo, QueryError> {
        self.engine
            .roster()
            .get(id)
            .ok_or(QueryError::UnknownCaller(id))
    }

    /// Current stats, or fresh defaults for a player without an entry.
    fn stats_of(&self, id: PlayerId) -> Result<PlayerStats, QueryError> {
        let store = self.engine.store();
        Ok(store
            .snapshot(id)?
            .unwrap_or_else(|| PlayerStats::new(store.start_rating())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stats_core::{Event, Team};

    use super::*;
    use crate::error::StoreError;
    use crate::roster::SessionRoster;
    use crate::settings::Settings;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const C: PlayerId = PlayerId(3);
    const D: PlayerId = PlayerId(4);

    fn engine() -> StatsEngine<SessionRoster> {
        let roster: SessionRoster = [
            PlayerInfo::new(A, "alice", 0, Team::Red),
            PlayerInfo::new(B, "bob", 0, Team::Blue),
            PlayerInfo::new(C, "carol", 0, Team::Red),
            PlayerInfo::new(D, "bobby", 0, Team::Spectator),
        ]
        .into_iter()
        .collect();
        StatsEngine::new(Settings::default(), Arc::new(roster))
    }

    fn kill(engine: &StatsEngine<SessionRoster>, killer: PlayerId, victim: PlayerId) {
        engine
            .handle(&Event::Kill {
                killer,
                victim,
                amount: 100,
            })
            .unwrap();
    }

    #[test]
    fn test_summary_of_caller() {
        let engine = engine();
        kill(&engine, A, B);
        let summary = engine.queries().summary(A, None).unwrap();
        assert_eq!(summary.kills, 1);
        assert_eq!(summary.damage, 100);
        assert!((summary.rating - 112.5).abs() < 1e-9);
        assert!((summary.experience - 12.5).abs() < 1e-9);
        assert_eq!(
            summary.to_string(),
            "^3Stats ^7[ alice ^7] K ^21 ^7D ^30 ^7A ^50 ^7TK ^10 ^7Dmg ^5100 ^7Skill ^3112.50 ^7XP ^612.5"
        );
    }

    #[test]
    fn test_summary_includes_carried_experience() {
        let engine = engine();
        kill(&engine, A, B);
        engine.handle(&Event::RoundStart).unwrap();
        kill(&engine, A, B);
        let summary = engine.queries().summary(B, Some("alice")).unwrap();
        assert_eq!(summary.player, A);
        assert_eq!(summary.kills, 1);
        assert!(summary.experience > 12.5);
    }

    #[test]
    fn test_summary_does_not_materialize() {
        let engine = engine();
        let summary = engine.queries().summary(A, Some("carol")).unwrap();
        assert!((summary.rating - 100.0).abs() < f64::EPSILON);
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_summary_rejects_unknown_players() {
        let engine = engine();
        assert_eq!(
            engine.queries().summary(A, Some("zed")),
            Err(QueryError::NotFound("zed".to_string()))
        );
        assert_eq!(
            engine.queries().summary(PlayerId(40), None),
            Err(QueryError::UnknownCaller(PlayerId(40)))
        );
    }

    #[test]
    fn test_ambiguous_name() {
        let engine = engine();
        // "bob" is exact for player 2, "bo" is not exact for anyone.
        assert_eq!(engine.queries().resolve("bob").unwrap().id, B);
        assert_eq!(
            engine.queries().resolve("bo"),
            Err(QueryError::Ambiguous {
                query: "bo".to_string(),
                candidates: vec!["bob".to_string(), "bobby".to_string()],
            })
        );
    }

    #[test]
    fn test_preview_kill_value() {
        let engine = engine();
        let value = engine.queries().preview_kill_value(A, "bob").unwrap();
        assert!((value - 12.5).abs() < 1e-9);
        assert!(engine.store().is_empty());

        kill(&engine, A, B);
        let preview = engine.queries().preview_kill(B, "alice").unwrap();
        assert!((preview.value - score(87.5, 112.5)).abs() < 1e-9);
        assert_eq!(
            preview.to_string(),
            format!("^3Stats: ^7bob^7 will get ^3{} ^7skill points for killing alice^7", preview.value)
        );
    }

    #[test]
    fn test_preview_rejections() {
        let engine = engine();
        let queries = engine.queries();
        assert_eq!(queries.preview_kill_value(A, "  "), Err(QueryError::MissingTarget));
        assert_eq!(queries.preview_kill_value(A, "alice"), Err(QueryError::SelfTarget));
        assert_eq!(queries.preview_kill_value(A, "carol"), Err(QueryError::SameTeam));
        // Spectators are never teammates.
        assert!(queries.preview_kill_value(A, "bobby").is_ok());
    }

    #[test]
    fn test_poisoned_target_is_reported() {
        let engine = engine();
        engine.store().poison(B);
        assert_eq!(
            engine.queries().summary(A, Some("bob")),
            Err(QueryError::Store(StoreError::Poisoned(B)))
        );
    }

    #[test]
    fn test_top_lists() {
        let engine = engine();
        let queries = engine.queries();
        assert_eq!(queries.top_skill(5).to_string(), "^3Stats: ^7No top players");

        kill(&engine, C, B);
        let top = queries.top_experience(1);
        assert_eq!(top.entries.len(), 1);
        assert_eq!(top.entries[0].name, "carol");
        assert_eq!(queries.top_skill(5).entries.len(), 2);
    }
}
