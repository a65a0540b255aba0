//! Engine settings.
//!
//! [`Settings`] is built in one pass from a JSON document and then handed to
//! the engine by value. Every field has a default; a missing key is logged as
//! a warning and a malformed one as an error, and neither stops startup.
//!
//! ```json
//! {
//!   "commands": { "mapstats-ms": 0, "testscore-ts": 0, "topstats": 2, "topxp": 2 },
//!   "settings": {
//!     "startPoints": 100, "resetscore": false, "resetxp": false,
//!     "show_awards": true, "show_awards_xp": true, "top_n": 5
//!   }
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};
use stats_core::RoundPolicy;
use tracing::{error, info, warn};

/// The player-facing stats commands that carry an access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Show one player's stats for the current map.
    MapStats,
    /// Preview the skill value of killing a player.
    TestScore,
    /// Top players by skill rating.
    TopStats,
    /// Top players by experience.
    TopXp,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::MapStats,
        Command::TestScore,
        Command::TopStats,
        Command::TopXp,
    ];

    /// The configuration key (and chat command) name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Command::MapStats => "mapstats",
            Command::TestScore => "testscore",
            Command::TopStats => "topstats",
            Command::TopXp => "topxp",
        }
    }

    const fn default_level(self) -> i32 {
        match self {
            Command::MapStats | Command::TestScore => 0,
            Command::TopStats | Command::TopXp => 2,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Access level and optional alias for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSetting {
    /// Minimum access level needed to use the command.
    pub level: i32,
    /// Short alias, taken from a `name-alias` configuration key.
    pub alias: Option<String>,
}

/// Fully defaulted engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Per-command settings, indexed by [`Command`] order.
    commands: [CommandSetting; 4],
    /// Rating every player starts a session with.
    pub start_points: f64,
    /// Reset rating and won/lost points at every round start.
    pub reset_score: bool,
    /// Drop experience at every round start instead of carrying it forward.
    pub reset_experience: bool,
    /// Announce the top skill players when a map ends.
    pub show_awards: bool,
    /// Announce the top experienced players when a map ends.
    pub show_awards_xp: bool,
    /// Entries per leaderboard.
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            commands: Command::ALL.map(|cmd| CommandSetting {
                level: cmd.default_level(),
                alias: None,
            }),
            start_points: 100.0,
            reset_score: false,
            reset_experience: false,
            show_awards: false,
            show_awards_xp: false,
            top_n: 5,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// An unreadable or unparsable file is logged and yields the defaults.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                info!(path = %path.display(), "loading settings");
                Self::from_json_str(&text)
            }
            Err(e) => {
                error!(path = %path.display(), %e, "could not read settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Parse settings from JSON text.
    #[must_use]
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                error!(%e, "could not parse settings, using defaults");
                Self::default()
            }
        }
    }

    /// Build settings from a parsed JSON document.
    #[must_use]
    pub fn from_value(doc: &Value) -> Self {
        let defaults = Self::default();
        let commands = section(doc, "commands");
        let settings = section(doc, "settings");

        let level_for = |cmd: Command| {
            let setting = load_command(commands, cmd);
            info!(command = cmd.name(), level = setting.level, alias = ?setting.alias, "command level");
            setting
        };

        Self {
            commands: Command::ALL.map(level_for),
            start_points: read(settings, "startPoints", defaults.start_points, as_f64),
            reset_score: read(settings, "resetscore", defaults.reset_score, as_bool),
            reset_experience: read(settings, "resetxp", defaults.reset_experience, as_bool),
            show_awards: read(settings, "show_awards", defaults.show_awards, as_bool),
            show_awards_xp: read(settings, "show_awards_xp", defaults.show_awards_xp, as_bool),
            top_n: read(settings, "top_n", defaults.top_n, as_count),
        }
    }

    /// Settings for one command.
    #[must_use]
    pub fn command(&self, cmd: Command) -> &CommandSetting {
        &self.commands[cmd as usize]
    }

    /// Override the level of one command.
    #[must_use]
    pub fn with_command_level(mut self, cmd: Command, level: i32) -> Self {
        self.commands[cmd as usize].level = level;
        self
    }

    /// Minimum access level for a player's stats to be reset at round start.
    #[must_use]
    pub fn round_reset_level(&self) -> i32 {
        self.command(Command::MapStats).level
    }

    /// What survives a round boundary.
    #[must_use]
    pub fn round_policy(&self) -> RoundPolicy {
        RoundPolicy {
            reset_score: self.reset_score,
            reset_experience: self.reset_experience,
            start_rating: self.start_points,
        }
    }
}

// ── Value readers ───────────────────────────────────────────────────────────

fn section<'a>(doc: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    doc.get(name).and_then(Value::as_object)
}

/// Read `key` from `section`, falling back to `default` when it is missing or
/// malformed.
fn read<T: fmt::Debug>(
    section: Option<&Map<String, Value>>,
    key: &str,
    default: T,
    parse: fn(&Value) -> Option<T>,
) -> T {
    let Some(raw) = section.and_then(|s| s.get(key)) else {
        warn!(key, ?default, "setting not found, using default");
        return default;
    };
    match parse(raw) {
        Some(value) => {
            info!(key, ?value, "setting loaded");
            value
        }
        None => {
            error!(key, %raw, ?default, "malformed setting, using default");
            default
        }
    }
}

/// A command is configured either as `name` or as `name-alias`.
fn load_command(section: Option<&Map<String, Value>>, cmd: Command) -> CommandSetting {
    let default = CommandSetting {
        level: cmd.default_level(),
        alias: None,
    };
    let Some(section) = section else {
        return default;
    };

    let prefix = format!("{}-", cmd.name());
    let found = section
        .iter()
        .find(|(key, _)| key.starts_with(&prefix))
        .or_else(|| section.get_key_value(cmd.name()));
    let Some((key, raw)) = found else {
        return default;
    };

    let alias = key
        .strip_prefix(&prefix)
        .filter(|alias| !alias.is_empty())
        .map(str::to_string);
    match as_level(raw) {
        Some(level) => CommandSetting { level, alias },
        None => {
            error!(key = %key, %raw, level = default.level, "malformed command level, using default");
            CommandSetting {
                level: default.level,
                alias,
            }
        }
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_level(v: &Value) -> Option<i32> {
    as_i64(v).and_then(|n| i32::try_from(n).ok())
}

fn as_count(v: &Value) -> Option<usize> {
    as_i64(v)
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n > 0)
}

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Some(true),
            "0" | "no" | "false" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
