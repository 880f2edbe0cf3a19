//! RPM change notification throttle.
//!
//! Start and stop always notify ([`force`](NotificationThrottle::force)).
//! Every other RPM mutation goes through
//! [`on_state_change`](NotificationThrottle::on_state_change), which is
//! called once per input cycle and only emits when the RPM pair differs
//! from the last notified one *and* the quiet interval has elapsed.  Since
//! it is polled continuously, the latest value is always delivered
//! eventually.
//!
//! Each emission is a human-readable [`AppEvent::Event`] followed by a
//! structured [`AppEvent::RpmUpdate`].

use log::debug;

use crate::presets::RpmPair;
use crate::state::SystemState;

use super::events::{AppEvent, Notice, truncated};
use super::ports::EventSink;

/// Active RPM at or above this is reported as "High speed", regardless of
/// the unit's own high setting.
pub const HIGH_SPEED_THRESHOLD_RPM: f32 = 1800.0;

pub struct NotificationThrottle {
    interval_ms: u32,
    last_rpm: RpmPair,
    last_emit_ms: Option<u32>,
}

impl NotificationThrottle {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_rpm: RpmPair::ZERO,
            last_emit_ms: None,
        }
    }

    /// Throttled path.  Returns `true` if a notification went out.
    pub fn on_state_change(
        &mut self,
        state: &SystemState,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> bool {
        if state.rpm() == self.last_rpm {
            return false;
        }
        let quiet = self
            .last_emit_ms
            .is_some_and(|last| now_ms.wrapping_sub(last) < self.interval_ms);
        if quiet {
            return false;
        }
        debug!(
            "RPM changed: ind={:.1} hall={:.1}",
            state.ind_rpm, state.hall_rpm
        );
        self.emit(state, now_ms, sink);
        true
    }

    /// Unthrottled path for start / stop.
    pub fn force(&mut self, state: &SystemState, now_ms: u32, sink: &mut impl EventSink) {
        self.emit(state, now_ms, sink);
    }

    fn emit(&mut self, state: &SystemState, now_ms: u32, sink: &mut impl EventSink) {
        self.last_rpm = state.rpm();
        self.last_emit_ms = Some(now_ms);

        let active_rpm = state.active_rpm();
        let speed = if active_rpm >= HIGH_SPEED_THRESHOLD_RPM {
            "High speed"
        } else {
            "Low speed"
        };

        sink.emit(&AppEvent::Event(Notice {
            event_type: "rpmChanged",
            message: truncated(format_args!(
                "{speed} is ON ({active_rpm:.0} RPM) - {}",
                state.system_type.display_name()
            )),
            timestamp: now_ms,
        }));
        sink.emit(&AppEvent::RpmUpdate {
            ind_rpm: state.ind_rpm,
            hall_rpm: state.hall_rpm,
            active_rpm,
        });
    }
}
