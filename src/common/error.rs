// src/common/error.rs

use super::frame::FramingError;
use super::response::ResponseLine;

/// Errors surfaced by a controller operation.
///
/// Generic over the channel's own error type so transport faults keep their
/// original detail.
#[derive(Debug, thiserror::Error)]
pub enum IrError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Non-timeout I/O failure from the channel. Fatal for the transaction.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// No response was classified within the attempt budget. The device may or
    /// may not have acted on the request.
    #[error("no response from device after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// A write could not be completed before its deadline.
    #[error("write did not complete in time")]
    WriteTimeout,

    /// The device answered with an explicit failure line.
    #[error("device reported failure: {0}")]
    DeviceFailure(ResponseLine),

    /// A response line grew past the line capacity without a terminator.
    #[error("response exceeded {capacity} bytes without a line terminator")]
    FramingOverflow { capacity: usize },

    /// The request was rejected before any channel access.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
}

impl<E: core::fmt::Debug> IrError<E> {
    /// True for failures that say nothing about whether the device acted.
    pub fn is_unconfirmed(&self) -> bool {
        matches!(self, IrError::Timeout { .. })
    }

    /// True for failures that come from the link itself rather than the device.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            IrError::Io(_) | IrError::WriteTimeout | IrError::FramingOverflow { .. }
        )
    }
}

impl<E: core::fmt::Debug> From<FramingError> for IrError<E> {
    fn from(e: FramingError) -> Self {
        match e {
            FramingError::Overflow { capacity } => IrError::FramingOverflow { capacity },
        }
    }
}

/// Malformed caller request, caught before the link is touched.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The request does not end with the `\n` commit delimiter.
    #[error("request must end with a newline")]
    MissingDelimiter,

    /// Nothing before the delimiter.
    #[error("request is empty")]
    Empty,

    /// The re-framed line would not fit the line capacity.
    #[error("request longer than {max} bytes")]
    TooLong { max: usize },

    /// Bytes outside printable ASCII.
    #[error("request contains non-ASCII bytes")]
    NotAscii,

    /// `NEC` followed by something other than eight hex digits.
    #[error("NEC code must be exactly 8 hex digits")]
    InvalidNecCode,

    /// Neither a NEC code nor a raw transmit payload.
    #[error("unrecognized transmit request")]
    UnrecognizedShape,

    /// Receive control point only accepts the query trigger.
    #[error("unrecognized receive trigger")]
    InvalidTrigger,
}

impl ValidationError {
    /// One-line usage hint to show next to the error.
    pub fn usage(&self) -> &'static str {
        match self {
            ValidationError::InvalidTrigger => "usage: LAST_RECV",
            ValidationError::InvalidNecCode => "usage: NEC <HEX8>, e.g. NEC 20DF10EF",
            _ => "usage: NEC <HEX8> | TX <freqHz> <us,us,...>",
        }
    }
}
