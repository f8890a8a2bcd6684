// src/controller/mock.rs

//! Scripted channel and clock shared by the controller tests.

use crate::common::hal_traits::{IrChannel, IrTimer};
use core::fmt::Write;
use core::time::Duration;
use heapless::{Deque, String, Vec};

// --- Mock Instant ---
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockInstant(pub u64);

impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

// --- Mock Comm Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockCommError;

/// What a read returns once the script runs dry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Idle {
    /// `Ok(0)` immediately, like an empty bulk transfer.
    Empty,
    /// `WouldBlock` until the caller's deadline passes.
    Block,
}

#[derive(Debug, Clone)]
enum ReadStep {
    Data(Vec<u8, 128>),
    Empty,
    Fail,
}

/// Channel double: reads follow a script, writes are logged.
///
/// With `auto_reply` set, every complete line written queues the reply a
/// well-behaved device would send.
#[derive(Debug)]
pub struct MockLink {
    pub now_us: u64,
    pub read_calls: u32,
    pub write_calls: u32,
    /// Most bytes accepted per write call.
    pub write_chunk: usize,
    pub write_stalled: bool,
    pub auto_reply: bool,
    idle: Idle,
    script: Deque<ReadStep, 64>,
    written: Vec<u8, 4096>,
    line: Vec<u8, 600>,
}

impl MockLink {
    pub fn new(idle: Idle) -> Self {
        MockLink {
            now_us: 0,
            read_calls: 0,
            write_calls: 0,
            write_chunk: usize::MAX,
            write_stalled: false,
            auto_reply: false,
            idle,
            script: Deque::new(),
            written: Vec::new(),
            line: Vec::new(),
        }
    }

    pub fn replying() -> Self {
        let mut link = MockLink::new(Idle::Block);
        link.auto_reply = true;
        link
    }

    pub fn stage(&mut self, bytes: &[u8]) {
        for piece in bytes.chunks(128) {
            let data = Vec::from_slice(piece).unwrap();
            self.script.push_back(ReadStep::Data(data)).unwrap();
        }
    }

    pub fn stage_empty(&mut self) {
        self.script.push_back(ReadStep::Empty).unwrap();
    }

    pub fn stage_error(&mut self) {
        self.script.push_back(ReadStep::Fail).unwrap();
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    fn reply_to_line(&mut self) {
        let mut reply: String<128> = String::new();
        let line = core::str::from_utf8(&self.line).unwrap().trim_end();
        if let Some(code) = line.strip_prefix("NEC ") {
            write!(reply, "[OK] NEC 0x{}\r\n", code).unwrap();
        } else if let Some(payload) = line.strip_prefix("TX ") {
            let freq = payload.split(' ').next().unwrap_or("0");
            let count = payload.split(',').count();
            write!(reply, "[DBG] parsing\r\n[OK] TX f={} Hz, n={}\r\n", freq, count).unwrap();
        } else if line == "LAST_RECV" {
            reply.push_str("REC 38000 9000,4500,560\r\n").unwrap();
        } else {
            reply.push_str("[ERR] unknown command\r\n").unwrap();
        }
        self.stage(reply.as_bytes());
    }
}

impl IrChannel for MockLink {
    type Error = MockCommError;

    fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        let step = match self.script.pop_front() {
            Some(step) => step,
            // Blocking polls are not counted as reads.
            None if self.idle == Idle::Block => return Err(nb::Error::WouldBlock),
            None => ReadStep::Empty,
        };
        self.read_calls += 1;
        match step {
            ReadStep::Data(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    // Keep the unread tail at the front of the script.
                    let tail = Vec::from_slice(&data[n..]).unwrap();
                    self.script.push_front(ReadStep::Data(tail)).unwrap();
                }
                Ok(n)
            }
            ReadStep::Empty => Ok(0),
            ReadStep::Fail => Err(nb::Error::Other(MockCommError)),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> nb::Result<usize, Self::Error> {
        if self.write_stalled {
            return Err(nb::Error::WouldBlock);
        }
        self.write_calls += 1;
        let n = bytes.len().min(self.write_chunk);
        for &b in &bytes[..n] {
            self.written.push(b).unwrap();
            if b == b'\n' {
                if self.auto_reply {
                    self.reply_to_line();
                }
                self.line.clear();
            } else {
                self.line.push(b).unwrap();
            }
        }
        Ok(n)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

impl IrTimer for MockLink {
    type Instant = MockInstant;

    fn delay_us(&mut self, us: u32) {
        self.now_us += us as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_us += ms as u64 * 1000;
    }

    fn now(&self) -> Self::Instant {
        MockInstant(self.now_us)
    }
}
