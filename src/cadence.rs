//! Fixed-interval timing for the cooperative control loop.
//!
//! The main loop sleeps for the shortest cadence and asks each
//! [`Cadence`] whether its interval has elapsed.  All arithmetic is
//! wrapping so a `u32` millisecond counter may roll over freely.

#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl Cadence {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// `true` on the first call and then once per interval.
    pub fn due(&mut self, now_ms: u32) -> bool {
        match self.last_ms {
            Some(last) if now_ms.wrapping_sub(last) < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    /// Change the interval without resetting the phase.
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}
