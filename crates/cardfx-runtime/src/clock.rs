#![forbid(unsafe_code)]

//! Monotonic host time for [`FrameDriver`](crate::FrameDriver).
//!
//! The driver takes `now` as a [`Duration`] so tests can feed synthetic
//! time. Native hosts without a frame timestamp of their own read this
//! clock instead; the demo renderer uses it to time a render run. Backed by
//! `web_time`, so it also works on wasm32.

use std::time::Duration;

use web_time::Instant;

/// Elapsed time since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Time since the clock was created. Never decreases.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
