// src/common/frame.rs

//! Newline framing over a chunked byte stream.
//!
//! Chunks arrive with arbitrary boundaries: one line may span several reads and
//! one read may carry several lines. [`LineFramer`] keeps only the unterminated
//! tail between calls and hands out each line as soon as its `\n` is seen.

use core::fmt;
use heapless::Vec;

/// Line terminator on the wire.
pub const TERMINATOR: u8 = b'\n';

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FramingError {
    /// The unterminated tail outgrew the framer. The partial line was dropped.
    #[error("line exceeded {capacity} bytes without a terminator")]
    Overflow { capacity: usize },
}

/// One complete line with its terminator (and any trailing `\r`) removed.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Message<const N: usize>(Vec<u8, N>);

impl<const N: usize> Message<N> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The line as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.0.starts_with(prefix)
    }
}

impl<const N: usize> fmt::Debug for Message<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "Message({:?})", s),
            None => write!(f, "Message({:?})", self.as_bytes()),
        }
    }
}

/// Incremental line splitter with a fixed capacity of `N` bytes per line.
#[derive(Debug, Default)]
pub struct LineFramer<const N: usize> {
    partial: Vec<u8, N>,
    // Set after an overflow: drop bytes up to the next terminator so the tail of
    // the oversize line is not taken for a line of its own.
    discarding: bool,
}

impl<const N: usize> LineFramer<N> {
    pub const fn new() -> Self {
        LineFramer {
            partial: Vec::new(),
            discarding: false,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes held for a line that has not been terminated yet.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    /// Drops any partial line and overflow state.
    pub fn reset(&mut self) {
        self.partial.clear();
        self.discarding = false;
    }

    /// Consumes bytes from the front of `input` until one line completes.
    ///
    /// On `Ok(Some(_))`, `input` is left pointing just past the terminator so the
    /// caller can keep scanning the same chunk. On `Ok(None)` all of `input` was
    /// consumed into the partial line.
    pub fn advance(&mut self, input: &mut &[u8]) -> Result<Option<Message<N>>, FramingError> {
        while let Some((&byte, rest)) = input.split_first() {
            *input = rest;

            if byte == TERMINATOR {
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                let mut line = core::mem::take(&mut self.partial);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(Message(line)));
            }

            if self.discarding {
                continue;
            }

            if self.partial.push(byte).is_err() {
                self.partial.clear();
                self.discarding = true;
                return Err(FramingError::Overflow { capacity: N });
            }
        }
        Ok(None)
    }

    /// Iterates over the lines completed by `chunk`.
    pub fn feed<'f, 'a>(&'f mut self, chunk: &'a [u8]) -> Lines<'f, 'a, N> {
        Lines {
            framer: self,
            input: chunk,
        }
    }
}

/// Iterator returned by [`LineFramer::feed`].
pub struct Lines<'f, 'a, const N: usize> {
    framer: &'f mut LineFramer<N>,
    input: &'a [u8],
}

impl<'a, const N: usize> Lines<'_, 'a, N> {
    /// Bytes of the chunk not yet scanned.
    pub fn remainder(&self) -> &'a [u8] {
        self.input
    }
}

impl<const N: usize> Iterator for Lines<'_, '_, N> {
    type Item = Result<Message<N>, FramingError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.framer.advance(&mut self.input) {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<const N: usize>(
        framer: &mut LineFramer<N>,
        chunk: &[u8],
    ) -> heapless::Vec<Message<N>, 8> {
        let mut out = heapless::Vec::new();
        for line in framer.feed(chunk) {
            out.push(line.unwrap()).unwrap();
        }
        out
    }

    #[test]
    fn test_split_at_every_boundary() {
        let wire = b"[OK] TX abc\n";
        for cut in 0..=wire.len() {
            let mut framer: LineFramer<64> = LineFramer::new();
            let first = collect(&mut framer, &wire[..cut]);
            let second = collect(&mut framer, &wire[cut..]);

            let total = first.len() + second.len();
            assert_eq!(total, 1, "cut at {}", cut);
            let line = first.iter().chain(second.iter()).next().unwrap();
            assert_eq!(line.as_str(), Some("[OK] TX abc"));
            assert_eq!(framer.pending(), 0);
        }
    }

    #[test]
    fn test_coalesced_lines_in_one_chunk() {
        let mut framer: LineFramer<64> = LineFramer::new();
        let lines = collect(&mut framer, b"[DBG] rawlen=68\r\n[OK] NEC 0x20DF10EF\r\nREC 38");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].as_str(), Some("[DBG] rawlen=68"));
        assert_eq!(lines[1].as_str(), Some("[OK] NEC 0x20DF10EF"));
        // Unterminated tail is held, not lost.
        assert_eq!(framer.pending(), 6);
        let lines = collect(&mut framer, b"000 560\n");
        assert_eq!(lines[0].as_str(), Some("REC 38000 560"));
    }

    #[test]
    fn test_advance_leaves_remainder() {
        let mut framer: LineFramer<16> = LineFramer::new();
        let mut input: &[u8] = b"one\ntwo\nthr";
        let first = framer.advance(&mut input).unwrap().unwrap();
        assert_eq!(first.as_bytes(), b"one");
        assert_eq!(input, b"two\nthr");
    }

    #[test]
    fn test_overflow_resets_and_discards_tail() {
        let mut framer: LineFramer<8> = LineFramer::new();
        let mut lines = framer.feed(b"0123456789abc\nok\n");
        assert_eq!(lines.next(), Some(Err(FramingError::Overflow { capacity: 8 })));
        // The rest of the oversize line is skipped, the next line is intact.
        assert_eq!(lines.next().unwrap().unwrap().as_str(), Some("ok"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_line() {
        let mut framer: LineFramer<8> = LineFramer::new();
        let lines = collect(&mut framer, b"\r\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_empty());
    }
}
