use gd_core::*;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use tokio::time::Instant;

/// Per-action deadlines.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    /// Time to submit a play decision.
    pub decision: Duration,
    /// Time to pick from the tribute pool.
    pub selection: Duration,
    /// Time to choose a return card.
    pub returning: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            decision: Duration::from_secs(PLAY_TIMEOUT),
            selection: Duration::from_secs(TRIBUTE_TIMEOUT),
            returning: Duration::from_secs(RETURN_TIMEOUT),
        }
    }
}

/// Deadline tracking for the pending request.
#[derive(Debug)]
pub struct Timer {
    config: TimerConfig,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            deadline: None,
        }
    }
    pub fn start_decision(&mut self) -> Instant {
        self.arm(self.config.decision)
    }
    pub fn start_selection(&mut self) -> Instant {
        self.arm(self.config.selection)
    }
    pub fn start_returning(&mut self) -> Instant {
        self.arm(self.config.returning)
    }
    fn arm(&mut self, window: Duration) -> Instant {
        let deadline = Instant::now() + window;
        self.deadline = Some(deadline);
        deadline
    }
    pub fn clear(&mut self) {
        self.deadline = None;
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

/// Wall-clock deadline for client display, unix milliseconds.
pub fn unix_deadline_ms(window: Duration) -> u64 {
    (SystemTime::now() + window)
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_windows() {
        let config = TimerConfig::default();
        assert_eq!(config.decision, Duration::from_secs(20));
        assert_eq!(config.selection, Duration::from_secs(3));
        assert_eq!(config.returning, Duration::from_secs(3));
    }

    #[test]
    fn timer_starts_cleared() {
        let timer = Timer::new(TimerConfig::default());
        assert!(timer.deadline().is_none());
        assert!(!timer.expired());
    }

    #[test]
    fn timer_arms_and_clears() {
        let mut timer = Timer::new(TimerConfig::default());
        timer.start_decision();
        assert!(timer.deadline().is_some());
        assert!(!timer.expired());
        assert!(timer.remaining().is_some());
        timer.clear();
        assert!(timer.deadline().is_none());
    }
}
