//! The event reactor.
//!
//! [`StatsEngine`] owns the stat store and applies each combat or round
//! event to it. Two-player events run as one [`StatStore::with_pair`]
//! transaction, so a concurrent reader never sees a kill's transfer applied
//! to one side only.

use std::sync::Arc;

use stats_core::stats::clamp_damage;
use stats_core::{Announcement, Event, Metric, PlayerId, PlayerStats, RawEvent, score};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::leaderboard::{Board, TopList};
use crate::roster::Roster;
use crate::round::{RoundReport, reset_round};
use crate::settings::Settings;
use crate::store::{PairMut, StatStore};

/// Reacts to game events by updating player stats.
#[derive(Debug)]
pub struct StatsEngine<R: Roster> {
    store: StatStore,
    roster: Arc<R>,
    settings: Settings,
}

impl<R: Roster> StatsEngine<R> {
    /// Create an engine with an empty store.
    #[must_use]
    pub fn new(settings: Settings, roster: Arc<R>) -> Self {
        Self {
            store: StatStore::new(settings.start_points),
            roster,
            settings,
        }
    }

    #[must_use]
    pub fn store(&self) -> &StatStore {
        &self.store
    }

    #[must_use]
    pub fn roster(&self) -> &R {
        &self.roster
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate and apply a raw event.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Event`] if the event is malformed, or any error
    /// from [`handle`](Self::handle).
    pub fn handle_raw(&self, raw: RawEvent) -> Result<Vec<Announcement>, EngineError> {
        let event = Event::try_from(raw)?;
        self.handle(&event)
    }

    /// Apply one event. Returns the chat lines the event produced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if a player the event touches has a
    /// poisoned entry. Nothing is applied in that case.
    pub fn handle(&self, event: &Event) -> Result<Vec<Announcement>, EngineError> {
        debug!(kind = ?event.kind(), "handling event");

        match *event {
            Event::Damage {
                attacker,
                target,
                amount,
            } => self.on_damage(attacker, target, clamp_damage(amount))?,
            Event::TeamDamage { attacker, amount } => {
                self.store
                    .with_player(attacker, |stats| stats.record_team_hit(clamp_damage(amount)))?;
            }
            Event::Kill {
                killer,
                victim,
                amount,
            } => self.on_kill(killer, victim, clamp_damage(amount))?,
            Event::TeamKill {
                killer,
                victim,
                amount,
            } => self.on_team_kill(killer, victim, clamp_damage(amount))?,
            Event::Assist { player } => {
                self.store.with_player(player, PlayerStats::record_assist)?;
            }
            Event::RoundStart => {
                self.start_round();
            }
            Event::GameExit | Event::MapChange => return Ok(self.awards()),
            Event::Disconnect { player } => {
                if self.store.remove(player) {
                    debug!(%player, "stat session ended");
                }
            }
        }
        Ok(Vec::new())
    }

    fn on_damage(&self, attacker: PlayerId, target: PlayerId, amount: u32) -> Result<(), EngineError> {
        self.store.with_pair(attacker, target, |pair| match pair {
            PairMut::Distinct(attacker, target) => {
                attacker.record_hit_dealt(amount);
                target.record_hit_taken(amount);
            }
            PairMut::Same(player) => {
                player.record_hit_dealt(amount);
                player.record_hit_taken(amount);
            }
        })?;
        Ok(())
    }

    fn on_kill(&self, killer: PlayerId, victim: PlayerId, amount: u32) -> Result<(), EngineError> {
        let value = self.store.with_pair(killer, victim, |pair| match pair {
            PairMut::Distinct(killer, victim) => {
                killer.record_hit_dealt(amount);
                victim.record_hit_taken(amount);
                killer.record_kill();
                victim.record_death();

                let value = score(killer.points(), victim.points());
                killer.gain_points(value);
                victim.lose_points(value);

                killer.refresh_experience();
                victim.refresh_experience();
                value
            }
            PairMut::Same(player) => {
                player.record_hit_dealt(amount);
                player.record_hit_taken(amount);
                player.record_kill();
                player.record_death();

                let value = score(player.points(), player.points());
                player.gain_points(value);
                player.lose_points(value);

                player.refresh_experience();
                value
            }
        })?;
        debug!(%killer, %victim, value, "skill transferred");
        Ok(())
    }

    fn on_team_kill(&self, killer: PlayerId, victim: PlayerId, amount: u32) -> Result<(), EngineError> {
        let value = self.store.with_pair(killer, victim, |pair| match pair {
            PairMut::Distinct(killer, victim) => {
                killer.record_team_hit(amount);
                killer.record_team_kill();

                let value = score(killer.points(), victim.points());
                victim.touch(Metric::Points);
                killer.lose_points(value);

                killer.refresh_experience();
                victim.refresh_experience();
                value
            }
            PairMut::Same(player) => {
                player.record_team_hit(amount);
                player.record_team_kill();

                let value = score(player.points(), player.points());
                player.lose_points(value);

                player.refresh_experience();
                value
            }
        })?;
        debug!(%killer, %victim, value, "team kill penalty");
        Ok(())
    }

    /// Reset every eligible player for a new round.
    pub fn start_round(&self) -> RoundReport {
        reset_round(
            &self.store,
            &*self.roster,
            &self.settings.round_policy(),
            self.settings.round_reset_level(),
        )
    }

    /// End-of-map announcements, as enabled in the settings.
    #[must_use]
    pub fn awards(&self) -> Vec<Announcement> {
        let mut lines = Vec::new();
        if self.settings.show_awards {
            lines.push(self.board(Board::Skill, self.settings.top_n));
        }
        if self.settings.show_awards_xp {
            lines.push(self.board(Board::Experience, self.settings.top_n));
        }
        if !lines.is_empty() {
            info!(count = lines.len(), "announcing awards");
        }
        lines
    }

    fn board(&self, board: Board, n: usize) -> Announcement {
        Announcement::new(TopList::build(&self.store, &*self.roster, board, n).to_string())
    }
}
