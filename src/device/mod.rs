// src/device/mod.rs

//! Device side of the link: the line-protocol responder that runs next to the
//! IR hardware, plus the capture and display flows that feed it.
//!
//! The three flows share nothing but a capture slot, bounded event queues and
//! one atomic:
//!
//! ```text
//! CaptureRecorder --latest capture--> DeviceResponder --events--> StatusBoard
//!        \____________________________events__________________________/
//! ```

pub mod capture;
pub mod parser;
pub mod responder;
pub mod status;

pub use capture::{
    render_capture, CaptureLine, CaptureReader, CaptureRecorder, CaptureSlot, CaptureWriter,
};
pub use parser::{parse_command, CommandError, DeviceCommand};
pub use responder::{Assembly, DeviceResponder};
pub use status::{StatusBoard, StatusDisplay, StatusEvent, StatusSummary};

use crate::common::pattern::DEFAULT_CARRIER_HZ;
use core::fmt::Debug;
use core::sync::atomic::{AtomicU32, Ordering};
use heapless::spsc::Queue;

/// Slots in each status event queue.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Driver for the IR LED. Modulation and timing are its business.
pub trait IrEmitter {
    type Error: Debug;

    /// Sends a 32-bit NEC frame, most significant bit first.
    fn send_nec(&mut self, code: u32) -> Result<(), Self::Error>;

    /// Sends alternating mark/space durations in microseconds.
    fn send_raw(&mut self, pulses: &[u16], carrier_khz: u8) -> Result<(), Self::Error>;
}

/// Where the responder writes its reply lines. The sink adds the terminator.
pub trait ResponseSink {
    fn write_line(&mut self, line: &str);
}

#[cfg(feature = "alloc")]
impl ResponseSink for alloc::vec::Vec<alloc::string::String> {
    fn write_line(&mut self, line: &str) {
        self.push(alloc::string::String::from(line));
    }
}

/// The carrier frequency used by `RAW` and reported for captures. Set by the
/// last `TX`/`TXM`.
#[derive(Debug)]
pub struct CarrierFrequency(AtomicU32);

impl CarrierFrequency {
    pub const fn new(freq_hz: u32) -> Self {
        CarrierFrequency(AtomicU32::new(freq_hz))
    }

    pub fn load(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    pub fn store(&self, freq_hz: u32) {
        self.0.store(freq_hz, Ordering::Release);
    }
}

impl Default for CarrierFrequency {
    fn default() -> Self {
        CarrierFrequency::new(DEFAULT_CARRIER_HZ)
    }
}

/// Backing storage for the device's capture slot and event queues.
///
/// Lives as long as the flows it connects, typically in a `static` or at the
/// top of `main`.
pub struct DeviceQueues {
    captures: CaptureSlot,
    command_events: Queue<StatusEvent, EVENT_QUEUE_DEPTH>,
    capture_events: Queue<StatusEvent, EVENT_QUEUE_DEPTH>,
}

impl Default for DeviceQueues {
    fn default() -> Self {
        DeviceQueues::new()
    }
}

impl DeviceQueues {
    pub const fn new() -> Self {
        DeviceQueues {
            captures: CaptureSlot::new(),
            command_events: Queue::new(),
            capture_events: Queue::new(),
        }
    }

    /// Wires the three flows together.
    pub fn split<'q, E: IrEmitter>(
        &'q mut self,
        emitter: E,
        carrier: &'q CarrierFrequency,
    ) -> (DeviceResponder<'q, E>, CaptureRecorder<'q>, StatusBoard<'q>) {
        let (capture_tx, capture_rx) = self.captures.split();
        let (command_event_tx, command_event_rx) = self.command_events.split();
        let (capture_event_tx, capture_event_rx) = self.capture_events.split();
        (
            DeviceResponder::new(emitter, carrier, capture_rx, command_event_tx),
            CaptureRecorder::new(carrier, capture_tx, capture_event_tx),
            StatusBoard::new(command_event_rx, capture_event_rx),
        )
    }
}
