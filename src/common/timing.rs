// src/common/timing.rs

use core::time::Duration;

// Defaults tuned for a CP2102-style USB/UART bridge at 115200 baud in front of
// an ESP32 running the responder firmware.

// === Line Capacity ===

/// Maximum length of one protocol line, terminator included. Response
/// framing buffers are sized to it as well.
pub const LINE_CAPACITY: usize = 512;

/// Bytes requested per channel read. One full-speed USB bulk packet.
pub const READ_CHUNK_SIZE: usize = 64;

// === Transmit Transactions ===

/// Read attempts before a transmit is declared unconfirmed.
pub const TRANSMIT_ATTEMPTS: u32 = 10;
/// Bound on each transmit read attempt.
pub const TRANSMIT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(200);

// === Receive Query Transactions ===

/// Read attempts before a `LAST_RECV` query is declared unconfirmed.
/// Capture lines are long and arrive over many packets.
pub const QUERY_ATTEMPTS: u32 = 100;
/// Bound on each query read attempt.
pub const QUERY_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(100);

// === Shared ===

/// Pause after an empty or timed-out read before the next attempt.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(10);
/// Pause between writing the request and the first read, giving the firmware
/// time to parse and start emitting.
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);
/// Bound on writing and flushing one request line.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(1000);
/// Sleep between non-blocking polls while waiting on a deadline.
pub const POLL_INTERVAL: Duration = Duration::from_micros(500);

// === Serial ===

/// Baud rate the responder firmware listens at.
pub const BAUD_RATE: u32 = 115_200;
