// src/device/responder.rs

use super::capture::{CaptureLine, CaptureReader};
use super::parser::{parse_command, DeviceCommand};
use super::status::StatusEvent;
use super::{CarrierFrequency, IrEmitter, ResponseSink, EVENT_QUEUE_DEPTH};
use crate::common::frame::{FramingError, LineFramer};
use crate::common::pattern::{carrier_khz, PatternError, PulsePattern};
use crate::common::timing::LINE_CAPACITY;
use core::fmt::Write;
use heapless::spsc::Producer;
use heapless::String;
use log::{debug, info, warn};

const HELP_LINES: [&str; 6] = [
    "IR ASCII cmds:",
    "  NEC <HEX8>              e.g. NEC 20DF10EF",
    "  TX <freqHz> <us,...>    e.g. TX 38000 9000,4500,560,560",
    "  TXM <freqHz> / lists / END",
    "  RAW <b b b>             each value * 50us",
    "  LAST_RECV               last captured pattern",
];

/// Multi-line transmit state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Assembly {
    #[default]
    Idle,
    /// Between `TXM` and `END`: every line is a pulse list.
    Assembling { freq_hz: u32, pattern: PulsePattern },
}

/// Command flow of the device: one line in, exactly one terminal line out per
/// executed action.
pub struct DeviceResponder<'q, E: IrEmitter> {
    emitter: E,
    carrier: &'q CarrierFrequency,
    assembly: Assembly,
    framer: LineFramer<LINE_CAPACITY>,
    captures: CaptureReader<'q>,
    last_capture: Option<CaptureLine>,
    events: Producer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
}

impl<'q, E: IrEmitter> DeviceResponder<'q, E> {
    pub(crate) fn new(
        emitter: E,
        carrier: &'q CarrierFrequency,
        captures: CaptureReader<'q>,
        events: Producer<'q, StatusEvent, EVENT_QUEUE_DEPTH>,
    ) -> Self {
        DeviceResponder {
            emitter,
            carrier,
            assembly: Assembly::Idle,
            framer: LineFramer::new(),
            captures,
            last_capture: None,
            events,
        }
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    /// Feeds raw bytes from the serial port, handling every line they complete.
    pub fn feed<S: ResponseSink>(&mut self, bytes: &[u8], out: &mut S) {
        let mut input = bytes;
        loop {
            match self.framer.advance(&mut input) {
                Ok(Some(line)) => match line.as_str() {
                    Some(text) if text.is_ascii() => self.handle_line(text, out),
                    _ => self.reject("non-ASCII input", out),
                },
                Ok(None) => break,
                Err(FramingError::Overflow { .. }) => self.reject("line too long", out),
            }
        }
    }

    /// Handles one complete line, terminator already removed.
    pub fn handle_line<S: ResponseSink>(&mut self, line: &str, out: &mut S) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        debug!("<- {}", line);

        match core::mem::take(&mut self.assembly) {
            Assembly::Idle => self.execute(line, out),
            Assembly::Assembling { freq_hz, pattern } => {
                self.assemble(freq_hz, pattern, line, out)
            }
        }
    }

    fn execute<S: ResponseSink>(&mut self, line: &str, out: &mut S) {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                let mut reason: String<128> = String::new();
                let _ = write!(reason, "{}", e);
                return self.reject(&reason, out);
            }
        };

        match command {
            DeviceCommand::Nec { code } => self.send_nec(code, out),
            DeviceCommand::Tx { freq_hz, list } => match PulsePattern::from_list(list) {
                Ok(pattern) => {
                    self.carrier.store(freq_hz);
                    self.send_raw(freq_hz, &pattern, out);
                }
                Err(e) => self.reject_pattern(e, out),
            },
            DeviceCommand::Txm { freq_hz } => {
                debug!("assembling pattern at {} Hz", freq_hz);
                self.assembly = Assembly::Assembling {
                    freq_hz,
                    pattern: PulsePattern::new(),
                };
            }
            DeviceCommand::End => self.reject("END without TXM", out),
            DeviceCommand::Raw { values } => {
                let tokens = values
                    .split(|c: char| c == ',' || c.is_ascii_whitespace())
                    .filter(|t| !t.is_empty());
                match PulsePattern::from_legacy_values(tokens) {
                    Ok(pattern) => {
                        let freq_hz = self.carrier.load();
                        self.send_raw(freq_hz, &pattern, out);
                    }
                    Err(e) => self.reject_pattern(e, out),
                }
            }
            DeviceCommand::Help => {
                for line in HELP_LINES {
                    out.write_line(line);
                }
                out.write_line("[OK] HELP");
                self.post(StatusEvent::HelpShown);
            }
            DeviceCommand::LastRecv => {
                if let Some(capture) = self.captures.take_latest() {
                    self.last_capture = Some(capture);
                }
                if let Some(capture) = &self.last_capture {
                    out.write_line(capture);
                } else {
                    return self.reject("no capture stored yet", out);
                }
                self.post(StatusEvent::CaptureShown);
            }
        }
    }

    fn assemble<S: ResponseSink>(
        &mut self,
        freq_hz: u32,
        mut pattern: PulsePattern,
        line: &str,
        out: &mut S,
    ) {
        if line.eq_ignore_ascii_case("END") {
            if pattern.is_empty() {
                return self.reject("pattern empty", out);
            }
            self.carrier.store(freq_hz);
            return self.send_raw(freq_hz, &pattern, out);
        }

        match pattern.extend_from_list(line) {
            Ok(added) => {
                debug!("assembled {} entries ({} total)", added, pattern.len());
                self.assembly = Assembly::Assembling { freq_hz, pattern };
            }
            // The pending pattern is discarded; the state is already Idle.
            Err(e) => self.reject_pattern(e, out),
        }
    }

    fn send_nec<S: ResponseSink>(&mut self, code: u32, out: &mut S) {
        if let Err(e) = self.emitter.send_nec(code) {
            warn!("emitter failed on NEC {:08X}: {:?}", code, e);
            return self.reject("emitter fault", out);
        }
        info!("sent NEC {:08X}", code);
        let mut reply: String<32> = String::new();
        let _ = write!(reply, "[OK] NEC 0x{:08X}", code);
        out.write_line(&reply);
        self.post(StatusEvent::NecSent { code });
    }

    fn send_raw<S: ResponseSink>(&mut self, freq_hz: u32, pattern: &PulsePattern, out: &mut S) {
        let khz = carrier_khz(freq_hz);
        if let Err(e) = self.emitter.send_raw(pattern.as_slice(), khz) {
            warn!("emitter failed on raw pattern: {:?}", e);
            return self.reject("emitter fault", out);
        }
        info!("sent {} entries at {} kHz", pattern.len(), khz);
        let mut reply: String<48> = String::new();
        let _ = write!(reply, "[OK] TX f={} Hz, n={}", freq_hz, pattern.len());
        out.write_line(&reply);
        self.post(StatusEvent::RawSent {
            freq_hz,
            count: pattern.len(),
        });
    }

    fn reject_pattern<S: ResponseSink>(&mut self, e: PatternError, out: &mut S) {
        let mut reason: String<64> = String::new();
        let _ = write!(reason, "{}", e);
        self.reject(&reason, out);
    }

    fn reject<S: ResponseSink>(&mut self, reason: &str, out: &mut S) {
        debug!("rejected: {}", reason);
        self.assembly = Assembly::Idle;
        let mut reply: String<160> = String::new();
        let _ = write!(reply, "[ERR] {}", reason);
        out.write_line(&reply);
        self.post(StatusEvent::Rejected);
    }

    fn post(&mut self, event: StatusEvent) {
        if self.events.enqueue(event).is_err() {
            warn!("status queue full, event dropped");
        }
    }
}
