//! Fixed-interval monitor clock for Fadeline.
//!
//! Each room actor owns one [`TurnClock`] and selects on it alongside its
//! command channel. The clock fires at a fixed cadence (100 ms by
//! default) and the room uses each tick to check the turn deadline and
//! drive pending AI moves. Rooms created in the same instant get a small
//! random jitter on their first tick so they do not all wake together.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         tick = clock.tick() => { /* check timeout, poke AI */ }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Clock configuration.
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Interval between ticks. [`Duration::ZERO`] disables the clock and
    /// [`TurnClock::tick`] pends forever.
    pub interval: Duration,
    /// Random jitter (0–max µs) added to the *first* tick to
    /// desynchronize rooms created at the same instant.
    pub initial_jitter_us: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            initial_jitter_us: 2_000, // 0–2 ms default jitter
        }
    }
}

impl ClockConfig {
    /// Config for a specific interval with default jitter.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TurnClock::tick`].
#[derive(Debug, Clone)]
pub struct Tick {
    /// Monotonically increasing tick number (starts at 1).
    pub number: u64,
    /// The configured interval.
    pub interval: Duration,
    /// `true` if this tick fired more than 10% past its deadline.
    pub late: bool,
    /// Intervals skipped when the tick fired late (0 normally).
    pub skipped: u64,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Fixed-interval clock. One `TurnClock` per room actor.
///
/// Overruns never queue up: when a tick fires late the next deadline is
/// rescheduled from now, so a stalled room resumes at its normal cadence
/// instead of firing a burst of stale ticks.
pub struct TurnClock {
    config: ClockConfig,
    interval: Option<Duration>,
    count: u64,
    /// When the next tick should fire (Tokio instant for `sleep_until`).
    next: Option<TokioInstant>,
}

impl TurnClock {
    /// Create a clock from config. The first tick is scheduled with
    /// optional jitter.
    pub fn new(config: ClockConfig) -> Self {
        let interval = if config.interval.is_zero() {
            None
        } else {
            Some(config.interval)
        };

        let next = interval.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                let us = rand::rng().random_range(0..config.initial_jitter_us);
                Duration::from_micros(us)
            } else {
                Duration::ZERO
            };
            TokioInstant::now() + d + jitter
        });

        match interval {
            None => debug!("turn clock created disabled (never fires)"),
            Some(d) => debug!(interval_ms = d.as_millis() as u64, "turn clock created"),
        }

        Self {
            config,
            interval,
            count: 0,
            next,
        }
    }

    /// Create a clock for a specific interval with default settings.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(ClockConfig::with_interval(interval))
    }

    /// Wait until the next tick is due.
    ///
    /// When disabled (`interval == 0`) this future pends forever —
    /// `tokio::select!` will still process other branches.
    pub async fn tick(&mut self) -> Tick {
        let (next, interval) = match (self.next, self.interval) {
            (Some(next), Some(interval)) => (next, interval),
            _ => {
                // This future never completes — select! handles other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.count += 1;

        let late_by = now.saturating_duration_since(next);
        let late = late_by > interval / 10;
        let mut skipped = 0u64;
        if late {
            skipped = late_by.as_nanos() as u64 / interval.as_nanos() as u64;
            if skipped > 0 {
                warn!(
                    tick = self.count,
                    skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "tick overrun, skipping ahead"
                );
            }
        }
        // Always schedule from now, not from the missed deadline.
        self.next = Some(now + interval);

        trace!(tick = self.count, late, "tick fired");

        Tick {
            number: self.count,
            interval,
            late,
            skipped,
        }
    }

    /// Whether the clock is disabled (interval 0).
    pub fn is_disabled(&self) -> bool {
        self.interval.is_none()
    }

    /// Ticks fired so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The configured interval, or `None` when disabled.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// The clock's configuration.
    pub fn config(&self) -> &ClockConfig {
        &self.config
    }
}
