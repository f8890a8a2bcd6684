// src/device/capture.rs

use super::status::StatusEvent;
use super::{CarrierFrequency, ResponseSink, EVENT_QUEUE_DEPTH};
use crate::common::pattern::TICK_US;
use crate::common::timing::LINE_CAPACITY;
use core::cell::UnsafeCell;
use core::fmt::Write;
use core::sync::atomic::{AtomicU8, Ordering};
use heapless::spsc::Producer;
use heapless::String;
use log::{debug, warn};

/// Room for the text of a capture line, leaving space for `\r\n` on the wire.
pub const CAPTURE_TEXT_CAPACITY: usize = LINE_CAPACITY - 2;

/// A rendered `REC <freqHz> <us,us,...>` line.
pub type CaptureLine = String<CAPTURE_TEXT_CAPACITY>;

/// Renders a receiver buffer as a capture line.
///
/// Entry 0 is the gap before the first mark and is skipped, as are zero
/// entries. Values that would not fit are cut at a whole value.
pub fn render_capture(freq_hz: u32, raw_ticks: &[u16]) -> CaptureLine {
    let mut line = CaptureLine::new();
    // "REC " plus at most ten digits always fits.
    let _ = write!(line, "REC {}", freq_hz);

    let mut separator = ' ';
    for &tick in raw_ticks.iter().skip(1).filter(|&&t| t != 0) {
        let us = tick as u32 * TICK_US;
        let mut item: String<12> = String::new();
        let _ = write!(item, "{}{}", separator, us);
        if line.push_str(&item).is_err() {
            debug!("capture line full, dropping the remaining values");
            break;
        }
        separator = ',';
    }
    line
}

const INDEX_MASK: u8 = 0b011;
const FRESH: u8 = 0b100;

/// Hands the newest capture from the capture flow to the command flow.
///
/// A triple buffer: the writer and the reader each own one buffer and the
/// third is parked in `middle`. Publishing swaps the writer's buffer into
/// `middle`, so an unread capture is replaced, never queued behind.
pub struct CaptureSlot {
    buffers: [UnsafeCell<CaptureLine>; 3],
    // Index of the parked buffer, plus FRESH while it holds an unread capture.
    middle: AtomicU8,
}

// Safety: each buffer is touched by at most one handle at a time. Ownership of
// a buffer only changes hands through the swap on `middle`.
unsafe impl Sync for CaptureSlot {}

impl Default for CaptureSlot {
    fn default() -> Self {
        CaptureSlot::new()
    }
}

impl CaptureSlot {
    pub const fn new() -> Self {
        CaptureSlot {
            buffers: [
                UnsafeCell::new(String::new()),
                UnsafeCell::new(String::new()),
                UnsafeCell::new(String::new()),
            ],
            middle: AtomicU8::new(0),
        }
    }

    /// Splits the slot into its writing and reading ends.
    pub fn split(&mut self) -> (CaptureWriter<'_>, CaptureReader<'_>) {
        *self.middle.get_mut() = 0;
        let slot: &Self = self;
        (
            CaptureWriter { slot, index: 1 },
            CaptureReader { slot, index: 2 },
        )
    }
}

/// Writing end of a [`CaptureSlot`].
pub struct CaptureWriter<'q> {
    slot: &'q CaptureSlot,
    index: u8,
}

impl CaptureWriter<'_> {
    /// Publishes `line`. Returns `true` if it replaced a capture nobody read.
    pub fn publish(&mut self, line: CaptureLine) -> bool {
        // Safety: `self.index` is owned by this writer until the swap below.
        unsafe { *self.slot.buffers[usize::from(self.index)].get() = line };
        let parked = self.slot.middle.swap(self.index | FRESH, Ordering::AcqRel);
        self.index = parked & INDEX_MASK;
        parked & FRESH != 0
    }
}

/// Reading end of a [`CaptureSlot`].
pub struct CaptureReader<'q> {
    slot: &'q CaptureSlot,
    index: u8,
}

impl CaptureReader<'_> {
    /// The newest capture published since the last call, if any.
    pub fn take_latest(&mut self) -> Option<CaptureLine> {
        if self.slot.middle.load(Ordering::Acquire) & FRESH == 0 {
            return None;
        }
        // Only the writer sets FRESH and only this reader clears it.
        let parked = self.slot.middle.swap(self.index, Ordering::AcqRel);
        self.index = parked & INDEX_MASK;
        // Safety: the swap handed the freshly written buffer to this reader.
        let line = unsafe { &mut *self.slot.buffers[usize::from(self.index)].get() };
        Some(core::mem::take(line))
    }
}

/// Capture flow: turns decoded receiver buffers into stored capture lines.
pub struct CaptureRecorder<'q> {
    carrier: &'q CarrierFrequency,
    captures: CaptureWriter<'q>,
    events: Producer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
}

impl<'q> CaptureRecorder<'q> {
    pub(crate) fn new(
        carrier: &'q CarrierFrequency,
        captures: CaptureWriter<'q>,
        events: Producer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
    ) -> Self {
        CaptureRecorder {
            carrier,
            captures,
            events,
        }
    }

    /// Stores one capture, replacing any earlier one, and reports it on `out`.
    ///
    /// Returns `false` if the buffer was empty.
    pub fn record<S: ResponseSink>(&mut self, raw_ticks: &[u16], out: &mut S) -> bool {
        let mut diag: String<32> = String::new();
        let _ = write!(diag, "[DBG] rawlen={}", raw_ticks.len());
        out.write_line(&diag);

        if raw_ticks.is_empty() {
            return false;
        }

        let freq_hz = self.carrier.load();
        let line = render_capture(freq_hz, raw_ticks);
        if self.captures.publish(line) {
            debug!("unread capture replaced");
        }

        let event = StatusEvent::Captured {
            freq_hz,
            entries: raw_ticks.len() - 1,
        };
        if self.events.enqueue(event).is_err() {
            warn!("status queue full, event dropped");
        }
        out.write_line("[OK] REC stored. Use LAST_RECV to view.");
        true
    }
}
