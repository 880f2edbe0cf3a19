//! Monotonic millisecond clock.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! The value is truncated to `u32` and wraps after ~49.7 days; every
//! consumer compares timestamps with `wrapping_sub`.

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic, wrapping).
    #[cfg(target_os = "espidf")]
    pub fn now_ms(&self) -> u32 {
        // SAFETY: esp_timer_get_time reads a free-running counter.
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    /// Milliseconds since construction (monotonic, wrapping).
    #[cfg(not(target_os = "espidf"))]
    pub fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
