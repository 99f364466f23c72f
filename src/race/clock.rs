//! Frame time sources

use std::time::Instant;

/// Monotonic time in seconds, one implementation per environment
pub trait ClockSource {
    fn now_secs(&mut self) -> f64;
}

/// Wall clock for native builds
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now_secs(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to (headless runs and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn advance(&mut self, secs: f64) {
        self.now += secs;
    }
}

impl ClockSource for ManualClock {
    fn now_secs(&mut self) -> f64 {
        self.now
    }
}
