//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the CKP emulator: the
//! run / stop / speed controller, command decoding, notification
//! throttling and the control link to transport contexts.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod link;
pub mod notify;
pub mod ports;
pub mod service;
