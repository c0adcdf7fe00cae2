use super::timer::TimerConfig;
use gd_core::*;
use std::time::Duration;

/// Driver configuration for one room.
#[derive(Debug, Clone, Copy)]
pub struct RoomConfig {
    pub timers: TimerConfig,
    /// Consecutive timeouts before a seat switches to autoplay.
    pub autoplay_after: u32,
    /// Shuffle seed; an entropy seed is drawn when unset.
    pub rng_seed: Option<u64>,
    /// Hard wall-clock cap on the match, unbounded when unset.
    pub max_match_duration: Option<Duration>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            timers: TimerConfig::default(),
            autoplay_after: AUTOPLAY_STRIKES,
            rng_seed: None,
            max_match_duration: None,
        }
    }
}

impl RoomConfig {
    /// Configuration with a fixed shuffle seed for reproducible deals.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Self::default()
        }
    }
}
