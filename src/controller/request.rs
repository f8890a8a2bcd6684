// src/controller/request.rs

//! Validation of caller requests into wire commands.
//!
//! Everything here runs before the link is locked, so a rejected request never
//! costs a byte of I/O.

use crate::common::command::{Command, LAST_RECV, MAX_TX_PAYLOAD};
use crate::common::error::ValidationError;
use crate::common::response::ResponseKind;
use crate::common::timing::LINE_CAPACITY;
use arrayvec::ArrayString;

/// A validated transmit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    command: Command,
    // The caller's text minus its delimiter; this is what the cache records.
    text: ArrayString<LINE_CAPACITY>,
}

impl TransmitRequest {
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The request as the caller wrote it, delimiter removed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> ResponseKind {
        self.command.response_kind()
    }
}

/// Parses a transmit control-point write.
///
/// Accepted shapes, each followed by `\n`:
/// - `NEC <8 hex digits>`
/// - `TX <freqHz> <us,us,...>`
/// - `<freqHz> <us,us,...>` (tag added on the wire)
pub fn parse_transmit_request(input: &[u8]) -> Result<TransmitRequest, ValidationError> {
    let stripped = strip_delimiter(input)?;
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let command = if has_keyword(trimmed, "NEC") {
        Command::nec(trimmed[3..].trim_start())?
    } else if has_keyword(trimmed, "TX") {
        Command::tx(trimmed[2..].trim_start())?
    } else if trimmed.as_bytes()[0].is_ascii_digit() {
        Command::tx(trimmed)?
    } else {
        return Err(ValidationError::UnrecognizedShape);
    };

    let text = ArrayString::from(stripped).map_err(|_| ValidationError::TooLong {
        max: MAX_TX_PAYLOAD,
    })?;
    Ok(TransmitRequest { command, text })
}

/// Parses a receive control-point write. Only `LAST_RECV\n` is accepted.
pub fn parse_receive_trigger(input: &[u8]) -> Result<Command, ValidationError> {
    let stripped = strip_delimiter(input)?;
    if stripped.trim() == LAST_RECV {
        Ok(Command::LastRecv)
    } else {
        Err(ValidationError::InvalidTrigger)
    }
}

fn strip_delimiter(input: &[u8]) -> Result<&str, ValidationError> {
    let body = input
        .strip_suffix(b"\n")
        .ok_or(ValidationError::MissingDelimiter)?;
    let body = body.strip_suffix(b"\r").unwrap_or(body);
    if !body.iter().all(|&b| b.is_ascii_graphic() || b == b' ') {
        return Err(ValidationError::NotAscii);
    }
    // Printable ASCII is always valid UTF-8.
    core::str::from_utf8(body).map_err(|_| ValidationError::NotAscii)
}

/// `keyword` alone or followed by a space, any case.
fn has_keyword(text: &str, keyword: &str) -> bool {
    match text.get(..keyword.len()) {
        Some(head) if head.eq_ignore_ascii_case(keyword) => {
            text.len() == keyword.len() || text.as_bytes()[keyword.len()] == b' '
        }
        _ => false,
    }
}
