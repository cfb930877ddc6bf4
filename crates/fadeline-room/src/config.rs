//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the room.
///
/// Integration tests shrink the timing fields to keep wall-clock runs
/// short; production uses the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// How long a human occupant may sit on their turn before eviction.
    pub turn_timeout: Duration,

    /// Monitor clock interval (AI auto-moves, timeout checks).
    pub tick_interval: Duration,

    /// Delay between a win and the automatic board reset.
    pub auto_reset_delay: Duration,

    /// Maximum spectator queue length.
    pub max_queue: usize,

    /// Chat messages are truncated to this many characters.
    pub chat_max_len: usize,

    /// Display names are truncated to this many characters.
    pub name_max_len: usize,

    /// Command channel capacity. Senders wait when it fills up.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(30),
            tick_interval: Duration::from_millis(100),
            auto_reset_delay: Duration::from_secs(2),
            max_queue: 15,
            chat_max_len: 100,
            name_max_len: 12,
            channel_size: 64,
        }
    }
}
