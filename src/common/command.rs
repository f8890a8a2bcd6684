// src/common/command.rs

use super::error::ValidationError;
use super::response::ResponseKind;
use super::timing::LINE_CAPACITY;
use arrayvec::ArrayString;
use core::fmt::{self, Write};

/// Tag that marks a raw transmit payload on the wire.
pub const TX_TAG: &str = "TX ";
/// Tag that marks a NEC transmit on the wire.
pub const NEC_TAG: &str = "NEC ";
/// The receive query line.
pub const LAST_RECV: &str = "LAST_RECV";

/// Longest payload that still fits one line after `TX ` and the terminator.
pub const MAX_TX_PAYLOAD: usize = LINE_CAPACITY - TX_TAG.len() - 1;

/// Number of hex digits in a NEC code.
pub const NEC_DIGITS: usize = 8;

/// One outbound request line.
///
/// The `Display` implementation produces the line without its terminator;
/// [`Command::format_into`] adds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `NEC <hex8>`. The digits keep the caller's case.
    Nec { code: ArrayString<NEC_DIGITS> },
    /// `TX <freqHz> <us,us,...>`. The payload is everything after the tag.
    Tx { payload: ArrayString<MAX_TX_PAYLOAD> },
    /// `LAST_RECV`.
    LastRecv,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Nec { code } => write!(f, "{}{}", NEC_TAG, code),
            Command::Tx { payload } => write!(f, "{}{}", TX_TAG, payload),
            Command::LastRecv => f.write_str(LAST_RECV),
        }
    }
}

impl Command {
    /// A NEC command from exactly eight hex digits.
    pub fn nec(code: &str) -> Result<Self, ValidationError> {
        if code.len() != NEC_DIGITS || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidNecCode);
        }
        let code = ArrayString::from(code).map_err(|_| ValidationError::InvalidNecCode)?;
        Ok(Command::Nec { code })
    }

    /// A raw transmit from its payload (without the `TX ` tag).
    pub fn tx(payload: &str) -> Result<Self, ValidationError> {
        if payload.is_empty() {
            return Err(ValidationError::Empty);
        }
        if !payload.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(ValidationError::NotAscii);
        }
        let payload = ArrayString::from(payload).map_err(|_| ValidationError::TooLong {
            max: MAX_TX_PAYLOAD,
        })?;
        Ok(Command::Tx { payload })
    }

    /// Which reply ends the transaction this command starts.
    pub fn response_kind(&self) -> ResponseKind {
        match self {
            Command::Nec { .. } => ResponseKind::Nec,
            Command::Tx { .. } => ResponseKind::Tx,
            Command::LastRecv => ResponseKind::Query,
        }
    }

    /// The complete wire line, terminator included.
    pub fn format_into(&self) -> Result<ArrayString<LINE_CAPACITY>, fmt::Error> {
        let mut line = ArrayString::new();
        writeln!(line, "{}", self)?;
        Ok(line)
    }
}
