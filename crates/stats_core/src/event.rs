//! Combat and round events.
//!
//! The game delivers events in a loose shape ([`RawEvent`]): a kind, an
//! acting client, an optional target and an optional text payload. Converting
//! to the typed [`Event`] checks that every player the kind needs is present
//! and parses the damage payload. A conversion failure rejects that one event
//! and nothing else.

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// The kinds of event the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Damage,
    TeamDamage,
    Kill,
    TeamKill,
    Assist,
    RoundStart,
    GameExit,
    MapChange,
    Disconnect,
}

/// An event as delivered by the game log parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// What happened.
    pub kind: EventKind,
    /// The acting player (attacker, killer, assisting or leaving player).
    #[serde(default)]
    pub client: Option<PlayerId>,
    /// The player acted upon, if any.
    #[serde(default)]
    pub target: Option<PlayerId>,
    /// Free-form payload; for hits and kills, the raw damage amount.
    #[serde(default)]
    pub data: Option<String>,
}

impl RawEvent {
    /// An event with no players and no payload.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            client: None,
            target: None,
            data: None,
        }
    }

    /// Set the acting player.
    #[must_use]
    pub fn client(mut self, player: PlayerId) -> Self {
        self.client = Some(player);
        self
    }

    /// Set the target player.
    #[must_use]
    pub fn target(mut self, player: PlayerId) -> Self {
        self.target = Some(player);
        self
    }

    /// Set the payload.
    #[must_use]
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Which side of an event a missing player was expected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Target,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => f.write_str("client"),
            Role::Target => f.write_str("target"),
        }
    }
}

/// Why a [`RawEvent`] could not be turned into an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// The kind needs a player that the event does not carry.
    #[error("{kind:?} event has no {role} player")]
    MissingPlayer {
        /// The event kind.
        kind: EventKind,
        /// The missing side.
        role: Role,
    },

    /// The kind needs a damage payload that the event does not carry.
    #[error("{kind:?} event has no damage payload")]
    MissingPayload {
        /// The event kind.
        kind: EventKind,
    },

    /// The damage payload is not a number.
    #[error("{kind:?} event has a non-numeric damage payload: {raw:?}")]
    MalformedPayload {
        /// The event kind.
        kind: EventKind,
        /// The payload as received.
        raw: String,
    },
}

/// A validated event, ready for the reactor.
///
/// Damage amounts are raw: clamping happens when they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Damage {
        attacker: PlayerId,
        target: PlayerId,
        amount: i64,
    },
    TeamDamage {
        attacker: PlayerId,
        amount: i64,
    },
    Kill {
        killer: PlayerId,
        victim: PlayerId,
        amount: i64,
    },
    TeamKill {
        killer: PlayerId,
        victim: PlayerId,
        amount: i64,
    },
    Assist {
        player: PlayerId,
    },
    RoundStart,
    GameExit,
    MapChange,
    /// The player's session ended; their stats are discarded.
    Disconnect {
        player: PlayerId,
    },
}

impl Event {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::Damage { .. } => EventKind::Damage,
            Event::TeamDamage { .. } => EventKind::TeamDamage,
            Event::Kill { .. } => EventKind::Kill,
            Event::TeamKill { .. } => EventKind::TeamKill,
            Event::Assist { .. } => EventKind::Assist,
            Event::RoundStart => EventKind::RoundStart,
            Event::GameExit => EventKind::GameExit,
            Event::MapChange => EventKind::MapChange,
            Event::Disconnect { .. } => EventKind::Disconnect,
        }
    }
}

impl TryFrom<RawEvent> for Event {
    type Error = EventError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let kind = raw.kind;
        let client = || raw.client.ok_or(EventError::MissingPlayer { kind, role: Role::Client });
        let target = || raw.target.ok_or(EventError::MissingPlayer { kind, role: Role::Target });
        let amount = || parse_amount(kind, raw.data.as_deref());

        let event = match kind {
            EventKind::Damage => Event::Damage {
                attacker: client()?,
                target: target()?,
                amount: amount()?,
            },
            EventKind::TeamDamage => Event::TeamDamage {
                attacker: client()?,
                amount: amount()?,
            },
            EventKind::Kill => Event::Kill {
                killer: client()?,
                victim: target()?,
                amount: amount()?,
            },
            EventKind::TeamKill => Event::TeamKill {
                killer: client()?,
                victim: target()?,
                amount: amount()?,
            },
            EventKind::Assist => Event::Assist { player: client()? },
            EventKind::RoundStart => Event::RoundStart,
            EventKind::GameExit => Event::GameExit,
            EventKind::MapChange => Event::MapChange,
            EventKind::Disconnect => Event::Disconnect { player: client()? },
        };
        Ok(event)
    }
}

/// Parse a damage payload: an integer, or a finite decimal truncated toward
/// zero.
fn parse_amount(kind: EventKind, data: Option<&str>) -> Result<i64, EventError> {
    let raw = data.ok_or(EventError::MissingPayload { kind })?;
    let trimmed = raw.trim();

    if let Ok(amount) = trimmed.parse::<i64>() {
        return Ok(amount);
    }
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount.trunc() as i64),
        _ => Err(EventError::MalformedPayload {
            kind,
            raw: raw.to_string(),
        }),
    }
}
