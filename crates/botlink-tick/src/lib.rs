//! Fixed-period ticker for botlink's periodic supervisors.
//!
//! A [`Ticker`] fires every `period`, with optional random jitter on the
//! first tick so several supervisors started at the same instant do not
//! fire in lockstep.
//!
//! # Integration
//!
//! A supervisor task owns one ticker and forwards each tick to the
//! connection actor:
//!
//! ```ignore
//! loop {
//!     ticker.wait_for_tick().await;
//!     if commands.send(Command::LivenessCheck).await.is_err() {
//!         break; // actor is gone
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Time between ticks.
    pub period: Duration,
    /// Upper bound of the random delay added to the first tick.
    pub initial_jitter: Duration,
}

impl TickerConfig {
    /// Shortest period accepted.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    pub fn every(period: Duration) -> Self {
        Self {
            period,
            initial_jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.initial_jitter = jitter;
        self
    }

    /// Clamps out-of-range values.
    ///
    /// - `period` raised to [`Self::MIN_PERIOD`].
    /// - `initial_jitter` capped to one period.
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(period = ?self.period, "ticker period below minimum, clamping");
            self.period = Self::MIN_PERIOD;
        }
        if self.initial_jitter > self.period {
            self.initial_jitter = self.period;
        }
        self
    }
}

/// Returned by [`Ticker::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Starts at 1.
    pub tick: u64,
    /// How far past its deadline this tick fired.
    pub late_by: Duration,
    /// Whole periods skipped because the ticker woke up late.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Fires once per period. A ticker that wakes up late fires once and
/// resumes the cadence from that moment.
pub struct Ticker {
    config: TickerConfig,
    next_tick: Instant,
    tick_count: u64,
}

impl Ticker {
    pub fn new(config: TickerConfig) -> Self {
        let config = config.validated();
        let jitter = if config.initial_jitter.is_zero() {
            Duration::ZERO
        } else {
            let max = config.initial_jitter.as_micros() as u64;
            Duration::from_micros(rand::rng().random_range(0..=max))
        };
        let next_tick = Instant::now() + config.period + jitter;

        debug!(
            period_ms = config.period.as_millis() as u64,
            jitter_ms = jitter.as_millis() as u64,
            "ticker created"
        );

        Self {
            config,
            next_tick,
            tick_count: 0,
        }
    }

    /// Ticker with no jitter.
    pub fn every(period: Duration) -> Self {
        Self::new(TickerConfig::every(period))
    }

    /// Waits for the next tick.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let deadline = self.next_tick;
        time::sleep_until(deadline).await;

        let now = Instant::now();
        let period = self.config.period;
        let late_by = now.saturating_duration_since(deadline);
        self.tick_count += 1;

        let ticks_skipped = (late_by.as_nanos() / period.as_nanos()) as u64;
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                "ticker fell behind, skipping ahead"
            );
        }
        self.next_tick = now + period;

        trace!(tick = self.tick_count, "tick");
        TickInfo {
            tick: self.tick_count,
            late_by,
            ticks_skipped,
        }
    }

    /// Changes the period; the next tick is one new period from now.
    pub fn set_period(&mut self, period: Duration) {
        self.config.period = period;
        self.config = self.config.clone().validated();
        self.next_tick = Instant::now() + self.config.period;
        debug!(period_ms = self.config.period.as_millis() as u64, "ticker period changed");
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }
}
