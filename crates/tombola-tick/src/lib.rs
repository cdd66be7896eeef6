//! Auto-draw timer for tombola rooms.
//!
//! A [`DrawTimer`] fires at a fixed interval (3 s by default) while it is
//! running and pends forever while it is paused. It does nothing on its
//! own: the room actor polls [`DrawTimer::wait_for_tick`] as one branch of
//! its `tokio::select!` loop and turns each tick into a draw, so timed
//! draws and player commands go through the same serialized loop.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = timer.wait_for_tick() => {
//!             let outcome = session.draw_next()?;
//!             if outcome.report.game_ended {
//!                 timer.pause();
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! Cancelling is just [`DrawTimer::pause`]. Because the timer is only ever
//! polled from the actor that owns it, a pause takes effect before the
//! next `select!` iteration and no tick can slip in after it.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timer settings.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Time between automatic draws.
    pub interval: Duration,
    /// Random delay (0–max ms) added to the first tick after the timer is
    /// armed, so rooms started together do not all draw on the same beat.
    pub initial_jitter_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            initial_jitter_ms: 0,
        }
    }
}

impl TimerConfig {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);
    pub const MIN_INTERVAL: Duration = Duration::from_millis(100);
    pub const MAX_INTERVAL: Duration = Duration::from_secs(60);

    /// A config with the given interval and no jitter.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps the interval into `MIN_INTERVAL..=MAX_INTERVAL`.
    ///
    /// Called by [`DrawTimer::new`].
    pub fn validated(mut self) -> Self {
        let clamped = self.interval.clamp(Self::MIN_INTERVAL, Self::MAX_INTERVAL);
        if clamped != self.interval {
            warn!(
                requested_ms = self.interval.as_millis() as u64,
                clamped_ms = clamped.as_millis() as u64,
                "draw interval out of range, clamping"
            );
            self.interval = clamped;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Returned by [`DrawTimer::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Ticks fired since the timer was created, starting at 1.
    pub tick: u64,
    /// `true` if the tick fired more than 10% of an interval late.
    pub overrun: bool,
    /// Whole intervals missed because of lateness. Missed ticks are not
    /// replayed; the next tick is scheduled one interval from now.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Periodic, pausable timer. One per room.
#[derive(Debug)]
pub struct DrawTimer {
    config: TimerConfig,
    tick_count: u64,
    next_tick: Instant,
    paused: bool,
}

impl DrawTimer {
    /// A running timer. The first tick is due one interval (plus jitter)
    /// from now.
    pub fn new(config: TimerConfig) -> Self {
        let config = config.validated();
        let next_tick = Instant::now() + config.interval + jitter(&config);

        debug!(
            interval_ms = config.interval.as_millis() as u64,
            "draw timer created"
        );

        Self {
            config,
            tick_count: 0,
            next_tick,
            paused: false,
        }
    }

    /// A timer that starts paused and waits for [`resume`](Self::resume).
    pub fn idle(config: TimerConfig) -> Self {
        let mut timer = Self::new(config);
        timer.paused = true;
        timer
    }

    /// Waits until the next tick is due.
    ///
    /// While paused this future never resolves, which leaves the other
    /// branches of a surrounding `select!` to run.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let due = self.next_tick;
        let interval = self.config.interval;
        time::sleep_until(due).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > interval / 10;
        let ticks_skipped = if overrun {
            (late_by.as_nanos() / interval.as_nanos()) as u64
        } else {
            0
        };
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "draw timer overrun, skipping ahead"
            );
        }

        // Schedule from now so a late tick never causes a burst of draws.
        self.next_tick = now + interval;

        trace!(tick = self.tick_count, overrun, "draw timer fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    /// Stops ticking until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "draw timer paused");
        }
    }

    /// Starts ticking again with a full interval (plus jitter) before the
    /// next tick. Idempotent.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_tick = Instant::now() + self.config.interval + jitter(&self.config);
            debug!(tick = self.tick_count, "draw timer resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

fn jitter(config: &TimerConfig) -> Duration {
    if config.initial_jitter_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..config.initial_jitter_ms))
}
