//! The per-player stat store.
//!
//! Each tracked player owns one [`PlayerStats`] behind its own mutex. The map
//! from [`PlayerId`] to entry is a [`DashMap`], so lookups for different
//! players do not contend; the per-entry mutex is what makes a handler's
//! updates to one player atomic with respect to other events.
//!
//! Kill handlers change two players in one logical step. [`StatStore::with_pair`]
//! locks both entries, always in ascending id order, before running the
//! update, so concurrent pair updates cannot deadlock and no event ever sees
//! one side of a transfer without the other.
//!
//! Map guards are never held while an entry mutex is being acquired.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use stats_core::{Metric, PlayerId, PlayerStats};

use crate::error::StoreError;

type Entry = Arc<Mutex<PlayerStats>>;

/// Mutable access to the two players of a two-player event.
#[derive(Debug)]
pub enum PairMut<'a> {
    /// Two different players, in the order they were requested.
    Distinct(&'a mut PlayerStats, &'a mut PlayerStats),
    /// Both sides are the same player.
    Same(&'a mut PlayerStats),
}

/// Owns the stat state of every tracked player.
#[derive(Debug)]
pub struct StatStore {
    entries: DashMap<PlayerId, Entry>,
    /// Rating a freshly materialized player starts with.
    start_rating: f64,
}

impl StatStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(start_rating: f64) -> Self {
        Self {
            entries: DashMap::new(),
            start_rating,
        }
    }

    /// The rating new entries start with.
    #[must_use]
    pub fn start_rating(&self) -> f64 {
        self.start_rating
    }

    /// Returns the entry for `id`, creating it if the player has none.
    fn entry(&self, id: PlayerId) -> Entry {
        let start_rating = self.start_rating;
        Arc::clone(
            self.entries
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(PlayerStats::new(start_rating))))
                .value(),
        )
    }

    /// Returns the entry for `id` without creating one.
    fn existing(&self, id: PlayerId) -> Option<Entry> {
        self.entries.get(&id).map(|e| Arc::clone(e.value()))
    }

    /// Run `f` with exclusive access to one player's stats, creating the
    /// entry if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if an earlier update of this player
    /// panicked.
    pub fn with_player<R>(
        &self,
        id: PlayerId,
        f: impl FnOnce(&mut PlayerStats) -> R,
    ) -> Result<R, StoreError> {
        let entry = self.entry(id);
        let mut stats = lock(&entry, id)?;
        Ok(f(&mut stats))
    }

    /// Run `f` with exclusive access to two players' stats at once, creating
    /// either entry if needed.
    ///
    /// When `first == second` the closure receives [`PairMut::Same`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if either entry is poisoned.
    pub fn with_pair<R>(
        &self,
        first: PlayerId,
        second: PlayerId,
        f: impl FnOnce(PairMut<'_>) -> R,
    ) -> Result<R, StoreError> {
        if first == second {
            return self.with_player(first, |stats| f(PairMut::Same(stats)));
        }

        let first_entry = self.entry(first);
        let second_entry = self.entry(second);

        // Lock order follows player id.
        let mut a;
        let mut b;
        if first < second {
            a = lock(&first_entry, first)?;
            b = lock(&second_entry, second)?;
        } else {
            b = lock(&second_entry, second)?;
            a = lock(&first_entry, first)?;
        }
        Ok(f(PairMut::Distinct(&mut a, &mut b)))
    }

    /// Current value of `metric`, materializing it with its default if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the entry is poisoned.
    pub fn get(&self, id: PlayerId, metric: Metric) -> Result<f64, StoreError> {
        self.with_player(id, |stats| {
            stats.touch(metric);
            stats.value(metric)
        })
    }

    /// Overwrite `metric`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the entry is poisoned.
    pub fn set(&self, id: PlayerId, metric: Metric, value: f64) -> Result<(), StoreError> {
        self.with_player(id, |stats| stats.set_value(metric, value))
    }

    /// Add `delta` to `metric`, starting from its default if absent.
    ///
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the entry is poisoned.
    pub fn increment(&self, id: PlayerId, metric: Metric, delta: f64) -> Result<f64, StoreError> {
        self.with_player(id, |stats| {
            stats.set_value(metric, stats.value(metric) + delta);
            stats.value(metric)
        })
    }

    /// Whether `metric` has been materialized for `id`.
    ///
    /// Absent and poisoned entries report `false`.
    #[must_use]
    pub fn exists(&self, id: PlayerId, metric: Metric) -> bool {
        self.existing(id)
            .is_some_and(|entry| lock(&entry, id).is_ok_and(|stats| stats.is_touched(metric)))
    }

    /// A copy of a player's stats, without materializing anything.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the entry is poisoned.
    pub fn snapshot(&self, id: PlayerId) -> Result<Option<PlayerStats>, StoreError> {
        let Some(entry) = self.existing(id) else {
            return Ok(None);
        };
        let stats = lock(&entry, id)?;
        Ok(Some(stats.clone()))
    }

    /// Discard a player's stats. Returns `true` if the player had an entry.
    pub fn remove(&self, id: PlayerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Ids of every player with an entry, ascending.
    #[must_use]
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.entries.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of players with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no player has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Poison a player's entry by panicking while holding its lock.
    #[cfg(test)]
    pub(crate) fn poison(&self, id: PlayerId) {
        let entry = self.entry(id);
        let result = std::thread::spawn(move || {
            let _guard = entry.lock();
            panic!("poisoning stat entry");
        })
        .join();
        assert!(result.is_err());
    }
}

fn lock(entry: &Mutex<PlayerStats>, id: PlayerId) -> Result<MutexGuard<'_, PlayerStats>, StoreError> {
    entry.lock().map_err(|_| StoreError::Poisoned(id))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);

    #[test]
    fn test_get_materializes_default() {
        let store = StatStore::new(100.0);
        assert!(!store.exists(A, Metric::Points));
        assert!((store.get(A, Metric::Points).unwrap() - 100.0).abs() < f64::EPSILON);
        assert!(store.exists(A, Metric::Points));
        assert!(!store.exists(A, Metric::Kills));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_increment_starts_from_default() {
        let store = StatStore::new(100.0);
        assert!((store.increment(A, Metric::Points, -12.5).unwrap() - 87.5).abs() < 1e-9);
        assert!((store.increment(A, Metric::Kills, 1.0).unwrap() - 1.0).abs() < 1e-9);
        assert!((store.increment(A, Metric::Kills, 1.0).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_overwrites() {
        let store = StatStore::new(100.0);
        store.set(A, Metric::Experience, 0.0).unwrap();
        assert!(store.exists(A, Metric::Experience));
        store.set(A, Metric::Experience, 42.0).unwrap();
        assert!((store.get(A, Metric::Experience).unwrap() - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_does_not_materialize() {
        let store = StatStore::new(100.0);
        assert_eq!(store.snapshot(A).unwrap(), None);
        assert!(store.is_empty());

        store.increment(A, Metric::Kills, 1.0).unwrap();
        let snap = store.snapshot(A).unwrap().unwrap();
        assert_eq!(snap.kills(), 1);
        assert!(!snap.is_touched(Metric::Points));
    }

    #[test]
    fn test_with_pair_keeps_argument_order() {
        let store = StatStore::new(100.0);
        // Requested high id first: the closure must still see (B, A).
        store
            .with_pair(B, A, |pair| match pair {
                PairMut::Distinct(first, second) => {
                    first.record_kill();
                    second.record_death();
                }
                PairMut::Same(_) => panic!("distinct players"),
            })
            .unwrap();
        assert_eq!(store.snapshot(B).unwrap().unwrap().kills(), 1);
        assert_eq!(store.snapshot(A).unwrap().unwrap().deaths(), 1);
    }

    #[test]
    fn test_with_pair_same_player() {
        let store = StatStore::new(100.0);
        let same = store
            .with_pair(A, A, |pair| matches!(pair, PairMut::Same(_)))
            .unwrap();
        assert!(same);
    }

    #[test]
    fn test_concurrent_pairs_do_not_deadlock() {
        let store = Arc::new(StatStore::new(100.0));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let (x, y) = if i % 2 == 0 { (A, B) } else { (B, A) };
                        store
                            .with_pair(x, y, |pair| {
                                if let PairMut::Distinct(winner, loser) = pair {
                                    winner.gain_points(1.0);
                                    loser.lose_points(1.0);
                                }
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let a = store.snapshot(A).unwrap().unwrap();
        let b = store.snapshot(B).unwrap().unwrap();
        assert!((a.points() + b.points() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_poisoned_entry_is_reported() {
        let store = StatStore::new(100.0);
        store.poison(A);
        assert_eq!(store.get(A, Metric::Kills), Err(StoreError::Poisoned(A)));
        assert_eq!(
            store.with_pair(B, A, |_| ()),
            Err(StoreError::Poisoned(A))
        );
        assert!(!store.exists(A, Metric::Kills));
        // Other players are unaffected.
        assert!(store.increment(B, Metric::Kills, 1.0).is_ok());
    }

    #[test]
    fn test_remove_ends_session() {
        let store = StatStore::new(100.0);
        store.increment(A, Metric::Kills, 1.0).unwrap();
        store.increment(B, Metric::Kills, 1.0).unwrap();
        assert_eq!(store.player_ids(), vec![A, B]);
        assert!(store.remove(A));
        assert!(!store.remove(A));
        assert_eq!(store.player_ids(), vec![B]);
        assert!(!store.exists(A, Metric::Kills));
    }
}
