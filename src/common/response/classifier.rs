// src/common/response/classifier.rs

use super::{classify_line, Classified, LineClass, ResponseKind, ResponseLine};
use crate::common::frame::{FramingError, LineFramer};
use crate::common::timing::LINE_CAPACITY;
use log::{debug, warn};

/// Incremental scanner that turns read chunks into at most one terminal
/// [`Classified`] line.
///
/// Lines before the match are dropped. Bytes after the match in the same chunk
/// are carried over and scanned first on the next call.
#[derive(Debug, Default)]
pub struct ResponseClassifier {
    framer: LineFramer<LINE_CAPACITY>,
    carry: heapless::Vec<u8, LINE_CAPACITY>,
}

impl ResponseClassifier {
    pub const fn new() -> Self {
        ResponseClassifier {
            framer: LineFramer::new(),
            carry: heapless::Vec::new(),
        }
    }

    /// Forgets partial lines and carried bytes.
    pub fn reset(&mut self) {
        self.framer.reset();
        self.carry.clear();
    }

    /// Bytes buffered but not yet classified.
    pub fn pending(&self) -> usize {
        self.framer.pending() + self.carry.len()
    }

    /// Scans `chunk` (after any carried bytes) for a terminal line of `kind`.
    pub fn classify(
        &mut self,
        chunk: &[u8],
        kind: ResponseKind,
    ) -> Result<Option<Classified>, FramingError> {
        if !self.carry.is_empty() {
            let carry = core::mem::take(&mut self.carry);
            let mut input: &[u8] = &carry;
            let scanned = self.scan(&mut input, kind);
            if !matches!(scanned, Ok(None)) {
                self.stash(input);
                self.stash(chunk);
                return scanned;
            }
        }

        // A match or an overflow stops the scan early; the rest waits for the
        // next call.
        let mut input = chunk;
        let scanned = self.scan(&mut input, kind);
        if !matches!(scanned, Ok(None)) {
            self.stash(input);
        }
        scanned
    }

    fn scan(
        &mut self,
        input: &mut &[u8],
        kind: ResponseKind,
    ) -> Result<Option<Classified>, FramingError> {
        while let Some(line) = self.framer.advance(input)? {
            let class = classify_line(line.as_bytes(), kind);
            if class == LineClass::Unrecognized {
                if !line.is_empty() {
                    debug!("discarding line while awaiting {:?}: {:?}", kind, line);
                }
                continue;
            }
            let Some(text) = ResponseLine::from_bytes(line.as_bytes()) else {
                debug!("discarding non-text line: {:?}", line);
                continue;
            };
            return Ok(Some(match class {
                LineClass::Success => Classified::Success(text),
                _ => Classified::Failure(text),
            }));
        }
        Ok(None)
    }

    fn stash(&mut self, bytes: &[u8]) {
        let room = self.carry.capacity() - self.carry.len();
        let take = bytes.len().min(room);
        if take < bytes.len() {
            warn!("dropping {} trailing response bytes", bytes.len() - take);
        }
        // Cannot fail: `take` fits the remaining capacity.
        let _ = self.carry.extend_from_slice(&bytes[..take]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_split_across_chunks() {
        let mut classifier = ResponseClassifier::new();
        assert_eq!(classifier.classify(b"[OK] T", ResponseKind::Tx), Ok(None));
        assert_eq!(classifier.classify(b"X f=38000 Hz", ResponseKind::Tx), Ok(None));
        let hit = classifier.classify(b", n=6\r\n", ResponseKind::Tx).unwrap();
        match hit {
            Some(Classified::Success(line)) => {
                assert_eq!(line.as_str(), "[OK] TX f=38000 Hz, n=6")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(classifier.pending(), 0);
    }

    #[test]
    fn test_noise_is_skipped() {
        let mut classifier = ResponseClassifier::new();
        let chunk =
            b"[DBG] rawlen=68\r\n[OK] REC stored. Use LAST_RECV to view.\r\nREC 38000 560,560\r\n";
        let hit = classifier.classify(chunk, ResponseKind::Query).unwrap();
        assert_eq!(
            hit,
            Some(Classified::Success(ResponseLine::from_bytes(b"REC 38000 560,560").unwrap()))
        );
    }

    #[test]
    fn test_failure_line() {
        let mut classifier = ResponseClassifier::new();
        let hit = classifier.classify(b"[ERR] bad hex\r\n", ResponseKind::Nec).unwrap();
        assert!(matches!(hit, Some(Classified::Failure(ref l)) if l.as_str() == "[ERR] bad hex"));
    }

    #[test]
    fn test_prefix_without_terminator_is_not_actionable() {
        let mut classifier = ResponseClassifier::new();
        assert_eq!(classifier.classify(b"[OK] NEC 0x20DF10EF", ResponseKind::Nec), Ok(None));
        assert!(classifier.pending() > 0);
    }

    #[test]
    fn test_bytes_after_match_are_kept() {
        let mut classifier = ResponseClassifier::new();
        let first = classifier
            .classify(b"[OK] TX a\n[OK] TX b\n", ResponseKind::Tx)
            .unwrap();
        assert!(matches!(first, Some(Classified::Success(ref l)) if l.as_str() == "[OK] TX a"));
        let second = classifier.classify(b"", ResponseKind::Tx).unwrap();
        assert!(matches!(second, Some(Classified::Success(ref l)) if l.as_str() == "[OK] TX b"));

        classifier.reset();
        assert_eq!(classifier.pending(), 0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut classifier = ResponseClassifier::new();
        let big = [b'x'; LINE_CAPACITY + 1];
        assert_eq!(
            classifier.classify(&big, ResponseKind::Query),
            Err(FramingError::Overflow { capacity: LINE_CAPACITY })
        );
    }

    #[test]
    fn test_bytes_after_overflow_are_kept() {
        let mut classifier = ResponseClassifier::new();
        let mut chunk: heapless::Vec<u8, 600> = heapless::Vec::new();
        chunk.extend_from_slice(&[b'x'; LINE_CAPACITY + 1]).unwrap();
        chunk.extend_from_slice(b"yy\n[OK] TX f=38000 Hz, n=2\n").unwrap();

        assert!(classifier.classify(&chunk, ResponseKind::Tx).is_err());
        // The tail of the oversize line is dropped, the reply behind it is not.
        match classifier.classify(b"", ResponseKind::Tx).unwrap() {
            Some(Classified::Success(line)) => {
                assert_eq!(line.as_str(), "[OK] TX f=38000 Hz, n=2")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(classifier.pending(), 0);
    }
}
