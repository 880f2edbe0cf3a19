//! RPM → output frequency mapping.
//!
//! `frequency = (rpm / 60) * K`, where `K` is the number of signal edges the
//! reference unit produces per shaft revolution (205 on the bench unit).
//! Non-positive and non-finite inputs clamp to 0 so a NaN or infinity can
//! never reach a hardware timer.

/// Pure RPM → Hz mapper for one calibration constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyMapper {
    edges_per_revolution: f32,
}

impl FrequencyMapper {
    pub const fn new(edges_per_revolution: f32) -> Self {
        Self {
            edges_per_revolution,
        }
    }

    /// Output frequency in Hz for `rpm`.  Total: never panics, never
    /// returns NaN, infinity or a negative value.
    pub fn frequency(&self, rpm: f32) -> f32 {
        if !rpm.is_finite() || rpm <= 0.0 {
            return 0.0;
        }
        let hz = (rpm / 60.0) * self.edges_per_revolution;
        if hz.is_finite() && hz > 0.0 { hz } else { 0.0 }
    }
}
