//! Idle countdown: how many more ticks recording may continue without motion.
//!
//! The timer itself is plain arithmetic. Atomicity between `reset` (called
//! from the sensor callback) and `tick` (called from the control loop) comes
//! from the controller lock that owns it.

/// Countdown of seconds remaining before recording is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimer {
    remaining: u32,
    threshold: u32,
}

impl IdleTimer {
    /// Creates an expired timer that will restore `threshold` on every reset.
    ///
    /// Starting expired means the controller is idle until the first motion
    /// event, which lets a day rollover happen even if nothing ever moves.
    pub fn new(threshold: u32) -> Self {
        Self {
            remaining: 0,
            threshold,
        }
    }

    /// Restores the full idle budget. Overwrites, never adds.
    pub fn reset(&mut self) {
        self.remaining = self.threshold;
    }

    /// Counts down one second and returns what is left.
    ///
    /// A no-op returning 0 once the timer has expired.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
