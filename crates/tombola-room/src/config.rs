//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tombola_tick::TimerConfig;

/// Settings for a room actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Start drawing automatically as soon as the session starts.
    pub auto_draw: bool,

    /// Time between automatic draws.
    pub draw_interval: Duration,

    /// Random delay (ms) before the first automatic draw after the timer
    /// is armed.
    pub draw_jitter_ms: u64,

    /// Capacity of the room's command channel. Senders wait when it is
    /// full.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            auto_draw: false,
            draw_interval: TimerConfig::DEFAULT_INTERVAL,
            draw_jitter_ms: 0,
            channel_size: 64,
        }
    }
}

impl RoomConfig {
    /// A config that auto-draws at `interval`.
    pub fn auto(interval: Duration) -> Self {
        Self {
            auto_draw: true,
            draw_interval: interval,
            ..Default::default()
        }
    }

    /// Fixes values the actor cannot run with. The draw interval itself
    /// is clamped by [`TimerConfig::validated`].
    pub fn validated(mut self) -> Self {
        if self.channel_size == 0 {
            tracing::warn!("channel_size of 0 is not allowed, using 1");
            self.channel_size = 1;
        }
        self
    }

    pub(crate) fn timer(&self) -> TimerConfig {
        TimerConfig {
            interval: self.draw_interval,
            initial_jitter_ms: self.draw_jitter_ms,
        }
    }
}
