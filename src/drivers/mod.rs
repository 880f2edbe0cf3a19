//! Pulse generators, operator input debouncing, status LED, and raw
//! peripheral initialisation.

pub mod debounce;
pub mod hw_init;
pub mod pulse;
pub mod status_led;
