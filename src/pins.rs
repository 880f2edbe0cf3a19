//! GPIO / peripheral pin assignments for the CKP emulator board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Signal outputs
// ---------------------------------------------------------------------------

/// Inductive CKP output 1 (Thermo King / APU).  LEDC timer 0, channel 0.
pub const IND_1_GPIO: i32 = 25;
/// Inductive CKP output 2, driven in phase with output 1.  LEDC timer 0, channel 1.
pub const IND_2_GPIO: i32 = 26;
/// Hall-effect CKP output (Carrier).  LEDC timer 1, channel 2.
pub const HALL_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Operator inputs (active LOW, internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary: held = high speed, released = low speed.
pub const SPEED_REQUEST_GPIO: i32 = 4;
/// Toggle switch: each press flips auto-run.
pub const AUTO_RUN_GPIO: i32 = 33;
/// Momentary stop button.
pub const STOP_GPIO: i32 = 32;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// On-board LED, blinks while the system runs.
pub const STATUS_LED_GPIO: i32 = 2;

/// Frequency the pulse generators are initialised with before first start.
pub const PULSE_INIT_FREQ_HZ: u32 = 205;
