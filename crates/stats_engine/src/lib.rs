//! # stats_engine
//!
//! The live side of the stats engine: a concurrent per-player
//! [`StatStore`], the [`StatsEngine`] event reactor, round resets,
//! leaderboards and the player-facing query surface.
//!
//! The engine never looks players up globally. It is handed a [`Roster`] at
//! construction and everything that walks "all players" goes through it.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use stats_core::{Event, PlayerId, PlayerInfo, Team};
//! use stats_engine::{SessionRoster, Settings, StatsEngine};
//!
//! let roster = SessionRoster::new();
//! roster.join(PlayerInfo::new(PlayerId(1), "alice", 0, Team::Red));
//! roster.join(PlayerInfo::new(PlayerId(2), "bob", 0, Team::Blue));
//!
//! let engine = StatsEngine::new(Settings::default(), Arc::new(roster));
//! engine
//!     .handle(&Event::Kill { killer: PlayerId(1), victim: PlayerId(2), amount: 100 })
//!     .unwrap();
//!
//! let summary = engine.queries().summary(PlayerId(1), None).unwrap();
//! assert_eq!(summary.rating, 112.5);
//! ```

pub mod error;
pub mod leaderboard;
pub mod query;
pub mod reactor;
pub mod roster;
pub mod round;
pub mod settings;
pub mod store;

pub use error::{EngineError, QueryError, StoreError};
pub use leaderboard::{Board, LeaderboardEntry, TopList, top_n};
pub use query::{KillPreview, StatSummary, StatsQueries};
pub use reactor::StatsEngine;
pub use roster::{Roster, SessionRoster};
pub use round::{RoundReport, reset_round};
pub use settings::{Command, CommandSetting, Settings};
pub use store::{PairMut, StatStore};
