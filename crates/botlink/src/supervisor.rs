//! Periodic supervisors that poke the connection actor.
//!
//! Both run as independent tasks and only send commands; every decision is
//! made by the actor. A supervisor stops by itself once the actor is gone.

use std::time::Duration;

use botlink_tick::{Ticker, TickerConfig};
use botlink_transport::Transport;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ConnectionHandle;

/// How often the reconnect check runs.
pub const RECONNECT_CHECK_PERIOD: Duration = Duration::from_secs(60);

/// Upper bound of the random offset added to the first reconnect check.
pub const RECONNECT_CHECK_JITTER: Duration = Duration::from_secs(5);

/// Runs a liveness pass every `interval`. A new value on the channel
/// restarts the cadence with that period.
pub(crate) fn spawn_liveness<T: Transport>(
    handle: ConnectionHandle<T>,
    mut interval: watch::Receiver<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = Ticker::every(*interval.borrow_and_update());
        loop {
            tokio::select! {
                tick = ticker.wait_for_tick() => {
                    tracing::trace!(tick = tick.tick, "liveness check");
                    if handle.run_liveness_check().await.is_err() {
                        break;
                    }
                }
                changed = interval.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    ticker.set_period(*interval.borrow_and_update());
                }
            }
        }
        tracing::debug!("liveness supervisor stopped");
    })
}

/// Restarts a client that is down without a pending retry.
pub(crate) fn spawn_reconnect_check<T: Transport>(handle: ConnectionHandle<T>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            Ticker::new(TickerConfig::every(RECONNECT_CHECK_PERIOD).with_jitter(RECONNECT_CHECK_JITTER));
        loop {
            ticker.wait_for_tick().await;
            if handle.run_reconnect_check().await.is_err() {
                break;
            }
        }
        tracing::debug!("reconnect supervisor stopped");
    })
}
