// src/common/response/mod.rs

mod classifier;

pub use classifier::ResponseClassifier;

use crate::common::timing::LINE_CAPACITY;
use core::fmt;

/// Generic failure prefix the device uses for every rejected action.
pub const FAILURE_PREFIX: &[u8] = b"[ERR]";

/// Which transaction a response is being awaited for. Each kind has its own
/// success prefix; the failure prefix is shared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// `NEC <hex8>` transmit, answered by `[OK] NEC 0x...`.
    Nec,
    /// `TX <freq> <list>` transmit, answered by `[OK] TX f=... Hz, n=...`.
    Tx,
    /// `LAST_RECV` query, answered by the capture line itself.
    Query,
}

impl ResponseKind {
    pub const fn success_prefix(self) -> &'static [u8] {
        match self {
            ResponseKind::Nec => b"[OK] NEC",
            ResponseKind::Tx => b"[OK] TX",
            ResponseKind::Query => b"REC ",
        }
    }
}

/// A complete, terminator-stripped status line from the device.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ResponseLine(heapless::String<LINE_CAPACITY>);

impl ResponseLine {
    /// Copies `bytes` into a line. `None` if they are not UTF-8 or do not fit.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let text = core::str::from_utf8(bytes).ok()?;
        let mut line = heapless::String::new();
        line.push_str(text).ok()?;
        Some(ResponseLine(line))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResponseLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ResponseLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResponseLine({:?})", self.as_str())
    }
}

/// A line the classifier recognized as terminal for the awaited kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Success(ResponseLine),
    Failure(ResponseLine),
}

/// Classification of a single line, before any copying.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineClass {
    Success,
    Failure,
    /// Diagnostics, echoes and stale replies. Not terminal.
    Unrecognized,
}

/// Matches `line` against the success prefix for `kind` and the failure prefix.
/// Prefixes only count at the start of the line.
pub fn classify_line(line: &[u8], kind: ResponseKind) -> LineClass {
    if line.starts_with(kind.success_prefix()) {
        LineClass::Success
    } else if line.starts_with(FAILURE_PREFIX) {
        LineClass::Failure
    } else {
        LineClass::Unrecognized
    }
}
