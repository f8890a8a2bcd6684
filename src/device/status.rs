// src/device/status.rs

use super::EVENT_QUEUE_DEPTH;
use core::fmt::Write;
use heapless::spsc::Consumer;
use heapless::String;

/// Width of one display line.
pub const STATUS_LINE_WIDTH: usize = 24;

pub type StatusLine = String<STATUS_LINE_WIDTH>;

/// Something the display should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    NecSent { code: u32 },
    RawSent { freq_hz: u32, count: usize },
    Captured { freq_hz: u32, entries: usize },
    /// The command list was printed.
    HelpShown,
    /// The stored capture was sent to the host.
    CaptureShown,
    Rejected,
}

/// What the display renders: three text lines and a packet counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub lines: [StatusLine; 3],
    /// Frames sent plus captures stored. Wraps like the display's 16-bit counter.
    pub packet_count: u16,
}

impl StatusSummary {
    fn set(&mut self, title: &str, detail: core::fmt::Arguments<'_>, tail: &str) {
        for line in self.lines.iter_mut() {
            line.clear();
        }
        // Overlong text is clipped by the fixed width; a short line is fine.
        let _ = self.lines[0].push_str(title);
        let _ = self.lines[1].write_fmt(detail);
        let _ = self.lines[2].push_str(tail);
    }

    fn count_packet(&mut self) {
        self.packet_count = self.packet_count.wrapping_add(1);
    }

    /// Folds one event into the summary.
    pub fn apply(&mut self, event: &StatusEvent) {
        match *event {
            StatusEvent::NecSent { code } => {
                self.set("NEC", format_args!("{:08X}", code), "sent");
                self.count_packet();
            }
            StatusEvent::RawSent { freq_hz, count } => {
                self.set("TRANSMIT", format_args!("f={} Hz", freq_hz), "");
                let _ = write!(self.lines[2], "n={} slices", count);
                self.count_packet();
            }
            StatusEvent::Captured { freq_hz, entries } => {
                self.set("RECEIVED", format_args!("f={}", freq_hz), "");
                let _ = write!(self.lines[2], "n={}", entries);
                self.count_packet();
            }
            StatusEvent::HelpShown => {
                self.set("HELP", format_args!("commands listed"), "");
            }
            StatusEvent::CaptureShown => {
                self.set("LAST_RECV", format_args!("sent to host"), "");
            }
            StatusEvent::Rejected => {
                self.set("ERROR", format_args!("command rejected"), "");
            }
        }
    }
}

/// The screen. Layout is up to the implementation.
pub trait StatusDisplay {
    type Error;

    fn render(&mut self, summary: &StatusSummary) -> Result<(), Self::Error>;
}

/// Display flow: drains status events and redraws when something changed.
pub struct StatusBoard<'q> {
    commands: Consumer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
    captures: Consumer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
    summary: StatusSummary,
}

impl<'q> StatusBoard<'q> {
    pub(crate) fn new(
        commands: Consumer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
        captures: Consumer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
    ) -> Self {
        StatusBoard {
            commands,
            captures,
            summary: StatusSummary::default(),
        }
    }

    pub fn summary(&self) -> &StatusSummary {
        &self.summary
    }

    /// Applies every pending event and renders once if any arrived.
    /// Returns whether a render happened.
    pub fn refresh<D: StatusDisplay>(&mut self, display: &mut D) -> Result<bool, D::Error> {
        let mut changed = false;
        while let Some(event) = self.commands.dequeue() {
            self.summary.apply(&event);
            changed = true;
        }
        while let Some(event) = self.captures.dequeue() {
            self.summary.apply(&event);
            changed = true;
        }
        if changed {
            display.render(&self.summary)?;
        }
        Ok(changed)
    }
}
