//! Round boundary handling.

use stats_core::{PlayerId, RoundPolicy};
use tracing::{debug, error, info};

use crate::roster::Roster;
use crate::store::StatStore;

/// Outcome of one round reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Players whose stats were reset.
    pub reset: Vec<PlayerId>,
    /// Players below the reset level, left untouched.
    pub skipped: Vec<PlayerId>,
    /// Players whose reset failed.
    pub failed: Vec<PlayerId>,
}

/// Reset every eligible roster player for a new round.
///
/// A player is eligible when their level is at least `min_level`. Each player
/// is reset in its own transaction; a failure is logged and the loop moves on
/// to the next player.
pub fn reset_round(
    store: &StatStore,
    roster: &dyn Roster,
    policy: &RoundPolicy,
    min_level: i32,
) -> RoundReport {
    let mut report = RoundReport::default();

    for player in roster.players() {
        if player.level < min_level {
            debug!(player = %player.id, level = player.level, min_level, "below round reset level");
            report.skipped.push(player.id);
            continue;
        }

        match store.with_player(player.id, |stats| stats.start_new_round(policy)) {
            Ok(()) => report.reset.push(player.id),
            Err(e) => {
                error!(player = %player.id, name = %player.name, %e, "could not reset round stats");
                report.failed.push(player.id);
            }
        }
    }

    info!(
        reset = report.reset.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "round stats reset"
    );
    report
}

#[cfg(test)]
mod tests {
    use stats_core::{Metric, PlayerInfo, Team};

    use super::*;
    use crate::roster::SessionRoster;

    const KEEP_ALL: RoundPolicy = RoundPolicy {
        reset_score: false,
        reset_experience: false,
        start_rating: 100.0,
    };

    fn player(id: u32, level: i32) -> PlayerInfo {
        PlayerInfo::new(PlayerId(id), format!("p{id}"), level, Team::Red)
    }

    #[test]
    fn test_reset_carries_experience_forward() {
        let store = StatStore::new(100.0);
        let roster: SessionRoster = [player(1, 0)].into_iter().collect();
        store
            .with_player(PlayerId(1), |s| {
                s.record_kill();
                s.gain_points(10.0);
                s.refresh_experience();
            })
            .unwrap();

        let report = reset_round(&store, &roster, &KEEP_ALL, 0);
        assert_eq!(report.reset, vec![PlayerId(1)]);

        let s = store.snapshot(PlayerId(1)).unwrap().unwrap();
        assert_eq!(s.kills(), 0);
        assert!((s.experience() - 0.0).abs() < f64::EPSILON);
        assert!((s.old_experience() - 10.0).abs() < 1e-9);
        assert!((s.points() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_score_policy() {
        let store = StatStore::new(100.0);
        let roster: SessionRoster = [player(1, 0)].into_iter().collect();
        store.with_player(PlayerId(1), |s| s.lose_points(30.0)).unwrap();

        let policy = RoundPolicy {
            reset_score: true,
            reset_experience: true,
            start_rating: 100.0,
        };
        reset_round(&store, &roster, &policy, 0);

        let s = store.snapshot(PlayerId(1)).unwrap().unwrap();
        assert!((s.points() - 100.0).abs() < f64::EPSILON);
        assert!((s.points_lost() - 0.0).abs() < f64::EPSILON);
        assert!((s.old_experience() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_low_level_players_are_skipped() {
        let store = StatStore::new(100.0);
        let roster: SessionRoster = [player(1, 0), player(2, 2)].into_iter().collect();
        store.with_player(PlayerId(1), |s| s.record_kill()).unwrap();

        let report = reset_round(&store, &roster, &KEEP_ALL, 1);
        assert_eq!(report.reset, vec![PlayerId(2)]);
        assert_eq!(report.skipped, vec![PlayerId(1)]);
        assert_eq!(store.snapshot(PlayerId(1)).unwrap().unwrap().kills(), 1);
    }

    #[test]
    fn test_failed_player_does_not_stop_the_round() {
        let store = StatStore::new(100.0);
        let roster: SessionRoster = [player(1, 0), player(2, 0), player(3, 0)]
            .into_iter()
            .collect();
        store.with_player(PlayerId(3), |s| s.record_kill()).unwrap();
        store.poison(PlayerId(2));

        let report = reset_round(&store, &roster, &KEEP_ALL, 0);
        assert_eq!(report.reset, vec![PlayerId(1), PlayerId(3)]);
        assert_eq!(report.failed, vec![PlayerId(2)]);
        assert_eq!(store.snapshot(PlayerId(3)).unwrap().unwrap().kills(), 0);
        assert!(store.exists(PlayerId(1), Metric::Kills));
    }
}
