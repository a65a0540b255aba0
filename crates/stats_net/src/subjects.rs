//! NATS subject layout.
//!
//! Every subject lives under one prefix so several game servers can share a
//! NATS cluster:
//!
//! ```text
//! {prefix}.events            RawEvent        game → engine
//! {prefix}.roster            RosterUpdate    game → engine
//! {prefix}.query.{op}        QueryRequest    client → engine (request/reply)
//! {prefix}.say               Announcement    engine → game
//! {prefix}.status            ServiceStatus   engine → *
//! ```

use std::fmt;
use std::str::FromStr;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "stats";

// ── Query operations ────────────────────────────────────────────────────────

/// The request/reply operations served under `{prefix}.query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOp {
    /// One player's stats for the map.
    Summary,
    /// Preview the value of a kill.
    TestScore,
    /// Top players by skill.
    TopStats,
    /// Top players by experience.
    TopXp,
}

impl QueryOp {
    pub const ALL: [QueryOp; 4] = [
        QueryOp::Summary,
        QueryOp::TestScore,
        QueryOp::TopStats,
        QueryOp::TopXp,
    ];

    /// The subject token for this operation.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            QueryOp::Summary => "summary",
            QueryOp::TestScore => "testscore",
            QueryOp::TopStats => "topstats",
            QueryOp::TopXp => "topxp",
        }
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for QueryOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryOp::ALL
            .into_iter()
            .find(|op| op.token() == s)
            .ok_or_else(|| s.to_string())
    }
}

// ── Subject builders ────────────────────────────────────────────────────────

/// Subject names for one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects {
    prefix: String,
}

impl Default for Subjects {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Subjects {
    /// Subjects under `prefix`. Trailing dots are ignored.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('.').to_string(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `{prefix}.events`
    #[must_use]
    pub fn events(&self) -> String {
        format!("{}.events", self.prefix)
    }

    /// `{prefix}.roster`
    #[must_use]
    pub fn roster(&self) -> String {
        format!("{}.roster", self.prefix)
    }

    /// `{prefix}.query.{op}`
    #[must_use]
    pub fn query(&self, op: QueryOp) -> String {
        format!("{}.query.{op}", self.prefix)
    }

    /// `{prefix}.query.*`, matching every query operation.
    #[must_use]
    pub fn all_queries(&self) -> String {
        format!("{}.query.*", self.prefix)
    }

    /// `{prefix}.say`
    #[must_use]
    pub fn say(&self) -> String {
        format!("{}.say", self.prefix)
    }

    /// `{prefix}.status`
    #[must_use]
    pub fn status(&self) -> String {
        format!("{}.status", self.prefix)
    }

    /// The operation token of a query subject under this prefix.
    ///
    /// Returns `None` if `subject` is not a query subject of this prefix.
    /// The token itself is returned unparsed so callers can report unknown
    /// operations.
    #[must_use]
    pub fn query_token<'s>(&self, subject: &'s str) -> Option<&'s str> {
        subject
            .strip_prefix(self.prefix.as_str())
            .and_then(|s| s.strip_prefix(".query."))
    }
}
