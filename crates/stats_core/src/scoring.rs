//! Skill-transfer and experience formulas.
//!
//! Both functions are pure. The reactor calls [`score`] once per kill and
//! applies the same value to both sides, which is what keeps ordinary kills
//! zero-sum.

/// Smallest transfer a single kill can produce.
pub const MIN_TRANSFER: f64 = 1.0;

/// Largest transfer a single kill can produce.
pub const MAX_TRANSFER: f64 = 100.0;

/// Ratings are truncated to whole numbers and floored at this value before
/// the ratio is taken.
const MIN_RATING: i64 = 1;

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Skill points a killer rated `killer_rating` earns for killing a victim
/// rated `victim_rating`.
///
/// ```text
/// k, v   = trunc(rating), floored at 1
/// vshift = (v / k) / 2
/// points = clamp(15 * vshift + 5, 1, 100), rounded to 2 decimals
/// ```
///
/// Killing a higher-rated victim is worth more; two equal ratings yield
/// 12.5.
#[must_use]
pub fn score(killer_rating: f64, victim_rating: f64) -> f64 {
    let k = truncate_rating(killer_rating);
    let v = truncate_rating(victim_rating);

    let vshift = (v / k) / 2.0;
    let points = 15.0 * vshift + 5.0;

    round2(points.clamp(MIN_TRANSFER, MAX_TRANSFER))
}

fn truncate_rating(rating: f64) -> f64 {
    // `as` saturates and maps NaN to 0, which the floor then lifts to 1.
    (rating.trunc() as i64).max(MIN_RATING) as f64
}

/// Experience derived from a player's current kill/death and point-flow
/// counters.
///
/// Not cumulative: the result replaces the player's current-round value.
#[must_use]
pub fn experience(kills: u32, points_won: f64, points_lost: f64, deaths: u32) -> f64 {
    let real_points = points_won - points_lost;
    let kills = f64::from(kills);
    if deaths == 0 {
        kills * real_points
    } else {
        kills * real_points / f64::from(deaths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_equal_ratings_give_twelve_and_a_half() {
        assert!(approx(score(100.0, 100.0), 12.5));
        assert!(approx(score(1.0, 1.0), 12.5));
    }

    #[test]
    fn test_higher_rated_victim_is_worth_more() {
        let up = score(100.0, 200.0);
        let down = score(200.0, 100.0);
        assert!(approx(up, 20.0));
        assert!(approx(down, 8.75));
        assert!(up > down);
    }

    #[test]
    fn test_ratings_are_truncated_not_rounded() {
        // 112.9 -> 112, 87.9 -> 87: 15 * (87 / 112) / 2 + 5 = 10.825...
        assert!(approx(score(112.9, 87.9), 10.83));
        assert!(approx(score(112.9, 87.9), score(112.0, 87.0)));
    }

    #[test]
    fn test_ratings_below_one_are_floored() {
        assert!(approx(score(0.5, 100.0), score(1.0, 100.0)));
        assert!(approx(score(-40.0, -40.0), 12.5));
        assert!(approx(score(f64::NAN, 1.0), 12.5));
    }

    #[test]
    fn test_transfer_is_clamped() {
        // 15 * (1000 / 1) / 2 + 5 is far above the ceiling.
        assert!(approx(score(1.0, 1000.0), MAX_TRANSFER));
        // The formula never drops below 5, so the floor is only a guard.
        assert!(score(100_000.0, 1.0) >= MIN_TRANSFER);

        for k in [-10.0, 0.0, 1.0, 3.3, 50.0, 100.0, 250.0, 9_999.0] {
            for v in [-10.0, 0.0, 1.0, 3.3, 50.0, 100.0, 250.0, 9_999.0] {
                let s = score(k, v);
                assert!((MIN_TRANSFER..=MAX_TRANSFER).contains(&s), "score({k}, {v}) = {s}");
            }
        }
    }

    #[test]
    fn test_score_has_two_decimals() {
        let s = score(300.0, 7.0);
        assert!(approx(s, round2(s)));
    }

    #[test]
    fn test_experience_without_deaths() {
        assert!(approx(experience(2, 25.0, 0.0, 0), 50.0));
        assert!(approx(experience(0, 25.0, 0.0, 0), 0.0));
    }

    #[test]
    fn test_experience_divides_by_deaths() {
        assert!(approx(experience(3, 40.0, 10.0, 2), 45.0));
    }

    #[test]
    fn test_experience_can_be_negative() {
        assert!(approx(experience(1, 5.0, 12.5, 1), -7.5));
    }

    #[test]
    fn test_experience_is_idempotent() {
        let first = experience(4, 61.25, 12.5, 3);
        let second = experience(4, 61.25, 12.5, 3);
        assert_eq!(first.to_bits(), second.to_bits());
    }
}
