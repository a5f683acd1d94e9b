//! Per-attempt session bookkeeping.

use std::time::Duration;

use botlink_protocol::{Position, Profile, Vitals};
use botlink_transport::Endpoint;
use tokio::time::Instant;

/// Everything observed during one connection attempt.
///
/// A fresh record is created at every connect. Only the last disconnect
/// reason carries over, so status output keeps showing why the previous
/// session ended until a new one does.
#[derive(Debug, Clone, Default)]
pub struct SessionRecord {
    pub endpoint: Option<Endpoint>,
    pub connected_at: Option<Instant>,
    pub last_activity: Option<Instant>,
    pub last_keep_alive: Option<Instant>,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub profile: Option<Profile>,
    pub session_id: Option<String>,
    pub position: Position,
    pub vitals: Vitals,
    pub last_disconnect_reason: Option<String>,
    /// Set once an idle warning has been logged; cleared by activity.
    idle_warned: bool,
}

impl SessionRecord {
    pub fn fresh(endpoint: Endpoint, last_disconnect_reason: Option<String>) -> Self {
        Self {
            endpoint: Some(endpoint),
            last_disconnect_reason,
            ..Self::default()
        }
    }

    /// Stamps activity now.
    pub fn touch(&mut self) {
        self.last_activity = Some(Instant::now());
        self.idle_warned = false;
    }

    /// Time since the session came online.
    pub fn uptime(&self) -> Option<Duration> {
        self.connected_at.map(|at| at.elapsed())
    }

    /// Time since the last keep-alive, or since connecting if none arrived.
    pub fn since_keep_alive(&self) -> Option<Duration> {
        self.last_keep_alive
            .or(self.connected_at)
            .map(|at| at.elapsed())
    }

    pub fn idle_for(&self) -> Option<Duration> {
        self.last_activity.map(|at| at.elapsed())
    }

    /// The keep-alive silence, if it is longer than twice `interval`.
    pub fn keep_alive_overdue(&self, interval: Duration) -> Option<Duration> {
        self.since_keep_alive()
            .filter(|silent| *silent > interval.saturating_mul(2))
    }

    /// Returns the idle time the first time it reaches `limit` since the
    /// last activity, `None` otherwise. [`touch`](Self::touch) re-arms it.
    pub fn take_idle_warning(&mut self, limit: Duration) -> Option<Duration> {
        if self.idle_warned {
            return None;
        }
        let idle = self.idle_for().filter(|idle| *idle >= limit)?;
        self.idle_warned = true;
        Some(idle)
    }
}
