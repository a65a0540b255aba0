//! Per-player stat state.
//!
//! [`PlayerStats`] is a typed block of counters with one field per metric.
//! Every field has a declared default (the starting rating for
//! [`Metric::Points`], zero otherwise) and every write records the metric in
//! a [`MetricSet`]. Rankings use that set to tell a metric that was never
//! touched apart from one that was explicitly set to zero.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::scoring;

/// Largest amount a single hit may add to a damage counter.
pub const MAX_DAMAGE_PER_HIT: u32 = 100;

/// Clamp a raw damage amount from the game into `0..=MAX_DAMAGE_PER_HIT`.
#[must_use]
pub fn clamp_damage(raw: i64) -> u32 {
    raw.clamp(0, i64::from(MAX_DAMAGE_PER_HIT)) as u32
}

// ── Metrics ─────────────────────────────────────────────────────────────────

/// A named per-player statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    ShotsHit,
    DamageHit,
    ShotsGot,
    DamageGot,
    ShotsTeamHit,
    DamageTeamHit,
    TeamKills,
    Kills,
    Deaths,
    Assists,
    PointsWon,
    PointsLost,
    /// Current skill rating.
    Points,
    /// Experience derived for the current round.
    Experience,
    /// Experience folded in from earlier rounds of the same map session.
    OldExperience,
}

impl Metric {
    /// Every metric, in declaration order.
    pub const ALL: [Metric; 15] = [
        Metric::ShotsHit,
        Metric::DamageHit,
        Metric::ShotsGot,
        Metric::DamageGot,
        Metric::ShotsTeamHit,
        Metric::DamageTeamHit,
        Metric::TeamKills,
        Metric::Kills,
        Metric::Deaths,
        Metric::Assists,
        Metric::PointsWon,
        Metric::PointsLost,
        Metric::Points,
        Metric::Experience,
        Metric::OldExperience,
    ];

    /// The counters cleared unconditionally at every round start.
    pub const ROUND_COUNTERS: [Metric; 10] = [
        Metric::ShotsTeamHit,
        Metric::DamageTeamHit,
        Metric::ShotsHit,
        Metric::DamageHit,
        Metric::ShotsGot,
        Metric::DamageGot,
        Metric::TeamKills,
        Metric::Kills,
        Metric::Deaths,
        Metric::Assists,
    ];

    /// The stable name used on the wire and in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Metric::ShotsHit => "shotsHit",
            Metric::DamageHit => "damageHit",
            Metric::ShotsGot => "shotsGot",
            Metric::DamageGot => "damageGot",
            Metric::ShotsTeamHit => "shotsTeamHit",
            Metric::DamageTeamHit => "damageTeamHit",
            Metric::TeamKills => "teamKills",
            Metric::Kills => "kills",
            Metric::Deaths => "deaths",
            Metric::Assists => "assists",
            Metric::PointsWon => "pointsWon",
            Metric::PointsLost => "pointsLost",
            Metric::Points => "points",
            Metric::Experience => "experience",
            Metric::OldExperience => "oldexperience",
        }
    }

    /// Returns `true` for metrics stored as whole numbers.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(
            self,
            Metric::PointsWon
                | Metric::PointsLost
                | Metric::Points
                | Metric::Experience
                | Metric::OldExperience
        )
    }

    /// The value an untouched metric reads as.
    #[must_use]
    pub const fn default_value(self, start_rating: f64) -> f64 {
        match self {
            Metric::Points => start_rating,
            _ => 0.0,
        }
    }

    /// The single-bit [`MetricSet`] for this metric.
    #[must_use]
    pub const fn flag(self) -> MetricSet {
        MetricSet::from_bits_truncate(1 << self as u16)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A metric name that does not correspond to any [`Metric`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

bitflags! {
    /// The set of metrics that have been explicitly materialized for a player.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MetricSet: u16 {
        const SHOTS_HIT = 1 << 0;
        const DAMAGE_HIT = 1 << 1;
        const SHOTS_GOT = 1 << 2;
        const DAMAGE_GOT = 1 << 3;
        const SHOTS_TEAM_HIT = 1 << 4;
        const DAMAGE_TEAM_HIT = 1 << 5;
        const TEAM_KILLS = 1 << 6;
        const KILLS = 1 << 7;
        const DEATHS = 1 << 8;
        const ASSISTS = 1 << 9;
        const POINTS_WON = 1 << 10;
        const POINTS_LOST = 1 << 11;
        const POINTS = 1 << 12;
        const EXPERIENCE = 1 << 13;
        const OLD_EXPERIENCE = 1 << 14;
    }
}

// ── Round policy ────────────────────────────────────────────────────────────

/// What survives a round boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundPolicy {
    /// Reset rating to `start_rating` and clear won/lost points.
    pub reset_score: bool,
    /// Drop the round's experience instead of folding it into the running
    /// total.
    pub reset_experience: bool,
    /// The rating a reset player starts over at.
    pub start_rating: f64,
}

// ── Player stats ────────────────────────────────────────────────────────────

/// The running statistics of one tracked player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    shots_hit: u32,
    damage_hit: u64,
    shots_got: u32,
    damage_got: u64,
    shots_team_hit: u32,
    damage_team_hit: u64,
    team_kills: u32,
    kills: u32,
    deaths: u32,
    assists: u32,
    points_won: f64,
    points_lost: f64,
    points: f64,
    experience: f64,
    old_experience: f64,
    touched: MetricSet,
}

impl PlayerStats {
    /// Fresh stats for a new session: everything at its default, nothing
    /// touched.
    #[must_use]
    pub fn new(start_rating: f64) -> Self {
        Self {
            shots_hit: 0,
            damage_hit: 0,
            shots_got: 0,
            damage_got: 0,
            shots_team_hit: 0,
            damage_team_hit: 0,
            team_kills: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
            points_won: 0.0,
            points_lost: 0.0,
            points: start_rating,
            experience: 0.0,
            old_experience: 0.0,
            touched: MetricSet::empty(),
        }
    }

    // ── Generic access ──────────────────────────────────────────────────

    /// Current value of `metric`, as a float.
    #[must_use]
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ShotsHit => f64::from(self.shots_hit),
            Metric::DamageHit => self.damage_hit as f64,
            Metric::ShotsGot => f64::from(self.shots_got),
            Metric::DamageGot => self.damage_got as f64,
            Metric::ShotsTeamHit => f64::from(self.shots_team_hit),
            Metric::DamageTeamHit => self.damage_team_hit as f64,
            Metric::TeamKills => f64::from(self.team_kills),
            Metric::Kills => f64::from(self.kills),
            Metric::Deaths => f64::from(self.deaths),
            Metric::Assists => f64::from(self.assists),
            Metric::PointsWon => self.points_won,
            Metric::PointsLost => self.points_lost,
            Metric::Points => self.points,
            Metric::Experience => self.experience,
            Metric::OldExperience => self.old_experience,
        }
    }

    /// Overwrite `metric` and mark it touched.
    ///
    /// Integer metrics truncate toward zero and saturate at zero.
    pub fn set_value(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::ShotsHit => self.shots_hit = value as u32,
            Metric::DamageHit => self.damage_hit = value as u64,
            Metric::ShotsGot => self.shots_got = value as u32,
            Metric::DamageGot => self.damage_got = value as u64,
            Metric::ShotsTeamHit => self.shots_team_hit = value as u32,
            Metric::DamageTeamHit => self.damage_team_hit = value as u64,
            Metric::TeamKills => self.team_kills = value as u32,
            Metric::Kills => self.kills = value as u32,
            Metric::Deaths => self.deaths = value as u32,
            Metric::Assists => self.assists = value as u32,
            Metric::PointsWon => self.points_won = value,
            Metric::PointsLost => self.points_lost = value,
            Metric::Points => self.points = value,
            Metric::Experience => self.experience = value,
            Metric::OldExperience => self.old_experience = value,
        }
        self.touch(metric);
    }

    /// Mark `metric` as materialized without changing its value.
    pub fn touch(&mut self, metric: Metric) {
        self.touched |= metric.flag();
    }

    /// Whether `metric` has been materialized.
    #[must_use]
    pub fn is_touched(&self, metric: Metric) -> bool {
        self.touched.contains(metric.flag())
    }

    /// All materialized metrics.
    #[must_use]
    pub fn touched(&self) -> MetricSet {
        self.touched
    }

    // ── Typed reads ─────────────────────────────────────────────────────

    #[must_use]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    #[must_use]
    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    #[must_use]
    pub fn assists(&self) -> u32 {
        self.assists
    }

    #[must_use]
    pub fn team_kills(&self) -> u32 {
        self.team_kills
    }

    #[must_use]
    pub fn damage_hit(&self) -> u64 {
        self.damage_hit
    }

    /// Current skill rating.
    #[must_use]
    pub fn points(&self) -> f64 {
        self.points
    }

    #[must_use]
    pub fn points_won(&self) -> f64 {
        self.points_won
    }

    #[must_use]
    pub fn points_lost(&self) -> f64 {
        self.points_lost
    }

    /// Current-round experience.
    #[must_use]
    pub fn experience(&self) -> f64 {
        self.experience
    }

    #[must_use]
    pub fn old_experience(&self) -> f64 {
        self.old_experience
    }

    /// Experience across every round of the map session.
    #[must_use]
    pub fn total_experience(&self) -> f64 {
        self.old_experience + self.experience
    }

    // ── Event mutations ─────────────────────────────────────────────────

    /// A hit this player landed on an opponent.
    pub fn record_hit_dealt(&mut self, amount: u32) {
        self.shots_hit += 1;
        self.damage_hit += u64::from(amount.min(MAX_DAMAGE_PER_HIT));
        self.touched |= MetricSet::SHOTS_HIT | MetricSet::DAMAGE_HIT;
    }

    /// A hit this player took from an opponent.
    pub fn record_hit_taken(&mut self, amount: u32) {
        self.shots_got += 1;
        self.damage_got += u64::from(amount.min(MAX_DAMAGE_PER_HIT));
        self.touched |= MetricSet::SHOTS_GOT | MetricSet::DAMAGE_GOT;
    }

    /// A hit this player landed on a teammate.
    pub fn record_team_hit(&mut self, amount: u32) {
        self.shots_team_hit += 1;
        self.damage_team_hit += u64::from(amount.min(MAX_DAMAGE_PER_HIT));
        self.touched |= MetricSet::SHOTS_TEAM_HIT | MetricSet::DAMAGE_TEAM_HIT;
    }

    pub fn record_kill(&mut self) {
        self.kills += 1;
        self.touched |= MetricSet::KILLS;
    }

    pub fn record_death(&mut self) {
        self.deaths += 1;
        self.touched |= MetricSet::DEATHS;
    }

    pub fn record_team_kill(&mut self) {
        self.team_kills += 1;
        self.touched |= MetricSet::TEAM_KILLS;
    }

    pub fn record_assist(&mut self) {
        self.assists += 1;
        self.touched |= MetricSet::ASSISTS;
    }

    /// Add `value` to the rating and to the points-won tally.
    pub fn gain_points(&mut self, value: f64) {
        self.points += value;
        self.points_won += value;
        self.touched |= MetricSet::POINTS | MetricSet::POINTS_WON;
    }

    /// Subtract `value` from the rating and add it to the points-lost tally.
    pub fn lose_points(&mut self, value: f64) {
        self.points -= value;
        self.points_lost += value;
        self.touched |= MetricSet::POINTS | MetricSet::POINTS_LOST;
    }

    /// Recompute current-round experience from the current counters.
    ///
    /// Reading the inputs materializes them, the same way reading them
    /// through the store would.
    pub fn refresh_experience(&mut self) {
        self.experience = scoring::experience(
            self.kills,
            self.points_won,
            self.points_lost,
            self.deaths,
        );
        self.touched |= MetricSet::KILLS
            | MetricSet::DEATHS
            | MetricSet::POINTS_WON
            | MetricSet::POINTS_LOST
            | MetricSet::EXPERIENCE;
    }

    // ── Round boundary ──────────────────────────────────────────────────

    /// Apply a round boundary: clear the round counters, then reset or carry
    /// forward score and experience according to `policy`.
    pub fn start_new_round(&mut self, policy: &RoundPolicy) {
        for metric in Metric::ROUND_COUNTERS {
            self.set_value(metric, 0.0);
        }

        if policy.reset_score {
            self.set_value(Metric::PointsLost, 0.0);
            self.set_value(Metric::PointsWon, 0.0);
            self.set_value(Metric::Points, policy.start_rating);
        }

        if !policy.reset_experience {
            let carried = self.old_experience + self.experience;
            self.set_value(Metric::OldExperience, carried);
        }
        self.set_value(Metric::Experience, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_new_stats_are_untouched_defaults() {
        let stats = PlayerStats::new(100.0);
        assert!(stats.touched().is_empty());
        for metric in Metric::ALL {
            assert!(approx(stats.value(metric), metric.default_value(100.0)));
            assert!(!stats.is_touched(metric));
        }
    }

    #[test]
    fn test_metric_flags_are_distinct() {
        let mut all = MetricSet::empty();
        for metric in Metric::ALL {
            assert!(!all.contains(metric.flag()), "{metric} shares a bit");
            all |= metric.flag();
        }
        assert_eq!(all, MetricSet::all());
    }

    #[test]
    fn test_metric_names_parse_back() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>(), Ok(metric));
        }
        assert_eq!("OldExperience".parse::<Metric>(), Ok(Metric::OldExperience));
        assert!("headshots".parse::<Metric>().is_err());
    }

    #[test]
    fn test_set_zero_is_distinct_from_untouched() {
        let mut stats = PlayerStats::new(100.0);
        stats.set_value(Metric::Experience, 0.0);
        assert!(stats.is_touched(Metric::Experience));
        assert!(!stats.is_touched(Metric::Points));
    }

    #[test]
    fn test_integer_metrics_truncate_and_saturate() {
        let mut stats = PlayerStats::new(100.0);
        stats.set_value(Metric::Kills, 3.9);
        assert_eq!(stats.kills(), 3);
        stats.set_value(Metric::Deaths, -2.0);
        assert_eq!(stats.deaths(), 0);
    }

    #[test]
    fn test_clamp_damage() {
        assert_eq!(clamp_damage(40), 40);
        assert_eq!(clamp_damage(100), 100);
        assert_eq!(clamp_damage(250), 100);
        assert_eq!(clamp_damage(-5), 0);
    }

    #[test]
    fn test_hits_never_add_more_than_the_cap() {
        let mut stats = PlayerStats::new(100.0);
        stats.record_hit_dealt(500);
        stats.record_hit_taken(101);
        stats.record_team_hit(u32::MAX);
        assert!(approx(stats.value(Metric::DamageHit), 100.0));
        assert!(approx(stats.value(Metric::DamageGot), 100.0));
        assert!(approx(stats.value(Metric::DamageTeamHit), 100.0));
        assert!(approx(stats.value(Metric::ShotsHit), 1.0));
    }

    #[test]
    fn test_gain_and_lose_points() {
        let mut stats = PlayerStats::new(100.0);
        stats.gain_points(12.5);
        stats.lose_points(2.5);
        assert!(approx(stats.points(), 110.0));
        assert!(approx(stats.points_won(), 12.5));
        assert!(approx(stats.points_lost(), 2.5));
        assert!(stats.is_touched(Metric::Points));
    }

    #[test]
    fn test_refresh_experience_is_a_projection() {
        let mut stats = PlayerStats::new(100.0);
        stats.record_kill();
        stats.record_kill();
        stats.record_death();
        stats.gain_points(30.0);
        stats.refresh_experience();
        let first = stats.experience();
        stats.refresh_experience();
        assert!(approx(first, 60.0));
        assert_eq!(first.to_bits(), stats.experience().to_bits());
    }

    fn played_round() -> PlayerStats {
        let mut stats = PlayerStats::new(100.0);
        stats.record_hit_dealt(30);
        stats.record_hit_taken(20);
        stats.record_team_hit(10);
        stats.record_kill();
        stats.record_death();
        stats.record_team_kill();
        stats.record_assist();
        stats.gain_points(12.5);
        stats.lose_points(5.0);
        stats.refresh_experience();
        stats.set_value(Metric::OldExperience, 4.0);
        stats
    }

    #[test]
    fn test_new_round_clears_round_counters() {
        let mut stats = played_round();
        stats.start_new_round(&RoundPolicy {
            reset_score: false,
            reset_experience: false,
            start_rating: 100.0,
        });
        for metric in Metric::ROUND_COUNTERS {
            assert!(approx(stats.value(metric), 0.0), "{metric} not cleared");
            assert!(stats.is_touched(metric));
        }
    }

    #[test]
    fn test_new_round_keeps_score_without_reset() {
        let mut stats = played_round();
        stats.start_new_round(&RoundPolicy {
            reset_score: false,
            reset_experience: true,
            start_rating: 100.0,
        });
        assert!(approx(stats.points(), 107.5));
        assert!(approx(stats.points_won(), 12.5));
        assert!(approx(stats.points_lost(), 5.0));
    }

    #[test]
    fn test_new_round_resets_score() {
        let mut stats = played_round();
        stats.start_new_round(&RoundPolicy {
            reset_score: true,
            reset_experience: true,
            start_rating: 80.0,
        });
        assert!(approx(stats.points(), 80.0));
        assert!(approx(stats.points_won(), 0.0));
        assert!(approx(stats.points_lost(), 0.0));
    }

    #[test]
    fn test_new_round_carries_experience_forward() {
        let mut stats = played_round();
        let before_old = stats.old_experience();
        let before_xp = stats.experience();
        stats.start_new_round(&RoundPolicy {
            reset_score: false,
            reset_experience: false,
            start_rating: 100.0,
        });
        assert!(approx(stats.old_experience(), before_old + before_xp));
        assert!(approx(stats.experience(), 0.0));
    }

    #[test]
    fn test_new_round_drops_experience_when_reset() {
        let mut stats = played_round();
        stats.start_new_round(&RoundPolicy {
            reset_score: false,
            reset_experience: true,
            start_rating: 100.0,
        });
        assert!(approx(stats.old_experience(), 4.0));
        assert!(approx(stats.experience(), 0.0));
    }
}
