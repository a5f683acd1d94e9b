//! Reconnect timer bookkeeping.
//!
//! At most one timer is pending. Every scheduling decision cancels the
//! previous timer first, and every timer carries an id so a fire that
//! races with a cancel can be recognized as stale by the actor.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// When and how often to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Flat delay before every retry.
    pub delay: Duration,
    /// Retries stop once this many consecutive failures were seen.
    pub max_attempts: u32,
    pub auto_reconnect: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(30),
            max_attempts: 10,
            auto_reconnect: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScheduleDecision {
    Scheduled { timer_id: u64, delay: Duration },
    /// The attempt ceiling was reached; nothing was armed.
    Exhausted,
}

struct PendingTimer {
    id: u64,
    fires_at: Instant,
    task: JoinHandle<()>,
}

/// Arms single-shot timers that post `fired(timer_id)` back to the actor.
pub(crate) struct ReconnectScheduler<M> {
    sender: mpsc::WeakSender<M>,
    fired: fn(u64) -> M,
    pending: Option<PendingTimer>,
    next_id: u64,
}

impl<M: Send + 'static> ReconnectScheduler<M> {
    pub(crate) fn new(sender: mpsc::WeakSender<M>, fired: fn(u64) -> M) -> Self {
        Self {
            sender,
            fired,
            pending: None,
            next_id: 1,
        }
    }

    /// Cancels any pending timer, then arms a new one unless
    /// `attempts` already reached the ceiling.
    pub(crate) fn schedule(&mut self, policy: &ReconnectPolicy, attempts: u32) -> ScheduleDecision {
        self.cancel_all();
        if attempts >= policy.max_attempts {
            return ScheduleDecision::Exhausted;
        }

        let timer_id = self.next_id;
        self.next_id += 1;
        let delay = policy.delay;
        let sender = self.sender.clone();
        let message = (self.fired)(timer_id);

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = sender.upgrade() {
                let _ = tx.send(message).await;
            }
        });
        self.pending = Some(PendingTimer {
            id: timer_id,
            fires_at: Instant::now() + delay,
            task,
        });
        ScheduleDecision::Scheduled { timer_id, delay }
    }

    /// Aborts the pending timer, if any.
    pub(crate) fn cancel_all(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.task.abort();
            tracing::trace!(timer_id = timer.id, "reconnect timer cancelled");
        }
    }

    /// Clears the pending slot if `timer_id` is the armed timer.
    /// Returns `false` for a stale or cancelled timer.
    pub(crate) fn take_if_current(&mut self, timer_id: u64) -> bool {
        match &self.pending {
            Some(timer) if timer.id == timer_id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Time left on the pending timer.
    pub(crate) fn remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|t| t.fires_at.saturating_duration_since(Instant::now()))
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<M> Drop for ReconnectScheduler<M> {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.task.abort();
        }
    }
}
