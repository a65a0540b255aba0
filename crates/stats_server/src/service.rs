//! The stats service: wires the engine to NATS.
//!
//! Subjects (under the configured prefix, default "stats"):
//!
//!   Subscribed:
//!     {prefix}.events          RawEvent, applied to the engine
//!     {prefix}.roster          RosterUpdate, applied to the roster
//!     {prefix}.query.{op}      QueryRequest, answered with a QueryReply
//!
//!   Published:
//!     {prefix}.say             Announcement produced by an event
//!     {prefix}.status          ServiceStatus, once at startup

use anyhow::Result;
use futures::StreamExt;
use stats_core::{Announcement, RawEvent};
use stats_engine::{Command, QueryError, SessionRoster, StatsEngine};
use stats_net::messages::{QueryReply, QueryRequest, RosterUpdate, ServiceStatus};
use stats_net::{NatsConnection, QueryOp, Subjects, decode};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type Engine = StatsEngine<SessionRoster>;

pub struct StatsService {
    engine: Engine,
    conn: NatsConnection,
    subjects: Subjects,
    instance_id: String,
}

impl StatsService {
    pub fn new(engine: Engine, conn: NatsConnection, subjects: Subjects) -> Self {
        Self {
            engine,
            conn,
            subjects,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Serve until the subscriptions close or the process is interrupted.
    pub async fn run(self) -> Result<()> {
        let mut events = self.conn.subscribe(&self.subjects.events()).await?;
        let mut roster = self.conn.subscribe(&self.subjects.roster()).await?;
        let mut queries = self.conn.subscribe(&self.subjects.all_queries()).await?;

        let status = ServiceStatus {
            instance_id: self.instance_id.clone(),
            prefix: self.subjects.prefix().to_string(),
            players: self.engine.roster().len(),
        };
        self.conn.publish(&self.subjects.status(), &status).await?;
        info!(
            instance_id = self.instance_id,
            prefix = self.subjects.prefix(),
            "stats service ready"
        );

        loop {
            tokio::select! {
                Some(msg) = events.next() => {
                    for line in handle_event(&self.engine, &msg.payload) {
                        self.announce(&line).await;
                    }
                }
                Some(msg) = roster.next() => {
                    apply_roster(&self.engine, &msg.payload);
                }
                Some(msg) = queries.next() => {
                    let token = self.subjects.query_token(msg.subject.as_str()).unwrap_or("");
                    let reply = answer(&self.engine, token, &msg.payload);
                    if let Err(e) = self.conn.reply(&msg, &reply).await {
                        error!(%e, "failed to publish reply");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted, shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn announce(&self, line: &Announcement) {
        if let Err(e) = self.conn.publish(&self.subjects.say(), line).await {
            error!(%e, "failed to publish announcement");
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// Decode and apply one event. Failures are logged and dropped.
fn handle_event(engine: &Engine, payload: &[u8]) -> Vec<Announcement> {
    let raw: RawEvent = match decode(payload) {
        Ok(raw) => raw,
        Err(e) => {
            error!(%e, "dropping undecodable event");
            return Vec::new();
        }
    };
    let kind = raw.kind;
    match engine.handle_raw(raw) {
        Ok(lines) => lines,
        Err(e) => {
            error!(?kind, %e, "event rejected");
            Vec::new()
        }
    }
}

fn apply_roster(engine: &Engine, payload: &[u8]) {
    let update: RosterUpdate = match decode(payload) {
        Ok(update) => update,
        Err(e) => {
            error!(%e, "dropping undecodable roster update");
            return;
        }
    };
    let roster = engine.roster();
    match update {
        RosterUpdate::Joined(info) => {
            debug!(player = %info.id, name = %info.name, level = info.level, "player joined");
            roster.join(info);
        }
        RosterUpdate::Left(player) => {
            roster.leave(player);
            engine.store().remove(player);
            debug!(%player, "player left");
        }
        RosterUpdate::TeamChanged { player, team } => {
            if !roster.set_team(player, team) {
                warn!(%player, ?team, "team change for unknown player");
            }
        }
    }
}

/// Answer one query request.
fn answer(engine: &Engine, token: &str, payload: &[u8]) -> QueryReply {
    let op: QueryOp = match token.parse() {
        Ok(op) => op,
        Err(_) => {
            warn!(op = token, "unknown operation");
            return QueryReply::error(format!("unknown operation: {token}"));
        }
    };
    let request: QueryRequest = match decode(payload) {
        Ok(request) => request,
        Err(e) => return QueryReply::error(format!("invalid request: {e}")),
    };

    let command = command_for(op);
    debug!(
        %op,
        caller = %request.caller,
        level = engine.settings().command(command).level,
        "received query"
    );

    let queries = engine.queries();
    let count = request.count.unwrap_or(engine.settings().top_n);
    let result: Result<String, QueryError> = match op {
        QueryOp::Summary => queries
            .summary(request.caller, request.target.as_deref())
            .map(|summary| summary.to_string()),
        QueryOp::TestScore => queries
            .preview_kill(request.caller, request.target.as_deref().unwrap_or(""))
            .map(|preview| preview.to_string()),
        QueryOp::TopStats => Ok(queries.top_skill(count).to_string()),
        QueryOp::TopXp => Ok(queries.top_experience(count).to_string()),
    };

    match result {
        Ok(text) => QueryReply::ok(text),
        Err(e) => QueryReply::error(e.to_string()),
    }
}

fn command_for(op: QueryOp) -> Command {
    match op {
        QueryOp::Summary => Command::MapStats,
        QueryOp::TestScore => Command::TestScore,
        QueryOp::TopStats => Command::TopStats,
        QueryOp::TopXp => Command::TopXp,
    }
}
