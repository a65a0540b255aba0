//! # stats_core
//!
//! Leaf data model for the player-performance scoring engine.
//!
//! This crate provides:
//!
//! - [`PlayerId`], [`Team`] and [`PlayerInfo`]: who a player is.
//! - [`PlayerStats`]: the typed per-player counter block, with an explicit
//!   [`MetricSet`] recording which [`Metric`]s have been materialized.
//! - [`scoring`]: the skill-transfer and experience formulas.
//! - [`event`]: typed combat/round events and their wire shape.
//! - [`Announcement`]: a line of public chat produced by the engine.

pub mod announcement;
pub mod event;
pub mod player;
pub mod scoring;
pub mod stats;

pub use announcement::Announcement;
pub use event::{Event, EventError, EventKind, RawEvent};
pub use player::{PlayerId, PlayerInfo, Team};
pub use scoring::{experience, round2, score};
pub use stats::{Metric, MetricSet, PlayerStats, RoundPolicy, UnknownMetric};
