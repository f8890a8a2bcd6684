// src/controller/cache.rs

use crate::common::timing::LINE_CAPACITY;
use heapless::String;

/// Shown for the transmit cache before any confirmed transmit.
pub const NO_TRANSMIT_SENTINEL: &str = "No IR command sent yet.";
/// Shown for the capture cache before any confirmed query.
pub const NO_CAPTURE_SENTINEL: &str = "No data read yet.";

/// Last confirmed transmit and last confirmed capture.
///
/// Only the controller writes here, and only after a transaction has been
/// classified as a success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistentCache {
    last_transmitted: Option<String<LINE_CAPACITY>>,
    last_captured: Option<String<LINE_CAPACITY>>,
}

impl PersistentCache {
    pub const fn new() -> Self {
        PersistentCache {
            last_transmitted: None,
            last_captured: None,
        }
    }

    /// The last confirmed transmit request, or the sentinel.
    pub fn last_transmitted(&self) -> &str {
        self.last_transmitted
            .as_deref()
            .unwrap_or(NO_TRANSMIT_SENTINEL)
    }

    /// The last capture line, or the sentinel.
    pub fn last_captured(&self) -> &str {
        self.last_captured.as_deref().unwrap_or(NO_CAPTURE_SENTINEL)
    }

    pub fn has_transmitted(&self) -> bool {
        self.last_transmitted.is_some()
    }

    pub fn has_captured(&self) -> bool {
        self.last_captured.is_some()
    }

    pub(crate) fn record_transmit(&mut self, request: &str) {
        self.last_transmitted = Some(truncated(request));
    }

    pub(crate) fn record_capture(&mut self, line: &str) {
        self.last_captured = Some(truncated(line));
    }
}

fn truncated(text: &str) -> String<LINE_CAPACITY> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
