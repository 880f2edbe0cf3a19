//! Callback event sinks — let a transport register for notifications.
//!
//! The transport owns delivery; it just hands the core a closure.
//! [`CallbackSink`] passes the structured event through, [`JsonSink`]
//! renders it to the JSON text the bench UI expects first.

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct CallbackSink<F: FnMut(&AppEvent)> {
    callback: F,
}

impl<F: FnMut(&AppEvent)> CallbackSink<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(&AppEvent)> EventSink for CallbackSink<F> {
    fn emit(&mut self, event: &AppEvent) {
        (self.callback)(event);
    }
}

/// Serializes each event and hands the text to `send`.
pub struct JsonSink<F: FnMut(&str)> {
    send: F,
}

impl<F: FnMut(&str)> JsonSink<F> {
    pub fn new(send: F) -> Self {
        Self { send }
    }
}

impl<F: FnMut(&str)> EventSink for JsonSink<F> {
    fn emit(&mut self, event: &AppEvent) {
        match serde_json::to_string(event) {
            Ok(text) => (self.send)(&text),
            Err(e) => warn!("event serialization failed: {}", e),
        }
    }
}
