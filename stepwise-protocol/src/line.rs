//! Byte stream → line assembly
//!
//! Serial links deliver bytes in arbitrary chunks. The assembler buffers them
//! until a `\n` arrives and hands out the completed line. `\r` is dropped so
//! CRLF and LF senders look the same.

use heapless::{String, Vec};

use crate::frame::MAX_LINE_LEN;

/// Errors reported while assembling lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded the buffer; the rest of it is discarded
    Overflow,
    /// Completed line is not valid UTF-8
    InvalidUtf8,
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineError::Overflow => f.write_str("line exceeds buffer"),
            LineError::InvalidUtf8 => f.write_str("line is not valid UTF-8"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LineError {}

/// State machine assembling terminated lines from single bytes
#[derive(Debug, Clone)]
pub struct LineAssembler<const N: usize = MAX_LINE_LEN> {
    buffer: Vec<u8, N>,
    /// Set after an overflow until the next terminator
    discarding: bool,
}

impl<const N: usize> Default for LineAssembler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineAssembler<N> {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Number of bytes buffered for the current partial line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a line,
    /// `Ok(None)` when more bytes are needed. An overflow is reported once,
    /// on the byte that did not fit; the remainder of that line is skipped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<N>>, LineError> {
        match byte {
            b'\n' => {
                if self.discarding {
                    self.reset();
                    return Ok(None);
                }
                let bytes = core::mem::take(&mut self.buffer);
                let line = String::from_utf8(bytes).map_err(|_| LineError::InvalidUtf8)?;
                Ok(Some(line))
            }
            b'\r' => Ok(None),
            _ if self.discarding => Ok(None),
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.discarding = true;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all<const N: usize>(
        assembler: &mut LineAssembler<N>,
        bytes: &[u8],
    ) -> Vec<Result<String<N>, LineError>, 8> {
        let mut out = Vec::new();
        for &b in bytes {
            match assembler.feed(b) {
                Ok(Some(line)) => out.push(Ok(line)).unwrap(),
                Ok(None) => {}
                Err(e) => out.push(Err(e)).unwrap(),
            }
        }
        out
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut assembler = LineAssembler::<32>::new();
        assert!(feed_all(&mut assembler, b"Start Da").is_empty());
        assert_eq!(assembler.pending(), 8);

        let out = feed_all(&mut assembler, b"ta Transfer\n10,5\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap().as_str(), "Start Data Transfer");
        assert_eq!(out[1].as_ref().unwrap().as_str(), "10,5");
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_crlf_same_as_lf() {
        let mut a = LineAssembler::<16>::new();
        let mut b = LineAssembler::<16>::new();
        assert_eq!(feed_all(&mut a, b"End\r\n"), feed_all(&mut b, b"End\n"));
    }

    #[test]
    fn test_empty_line() {
        let mut assembler = LineAssembler::<16>::new();
        let out = feed_all(&mut assembler, b"\n");
        assert_eq!(out[0].as_ref().unwrap().as_str(), "");
    }

    #[test]
    fn test_overflow_discards_until_terminator() {
        let mut assembler = LineAssembler::<4>::new();
        let out = feed_all(&mut assembler, b"123456789\n10,5\n");

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Err(LineError::Overflow));
        assert_eq!(out[1].as_ref().unwrap().as_str(), "10,5");
    }

    #[test]
    fn test_invalid_utf8_reported_and_recovers() {
        let mut assembler = LineAssembler::<16>::new();
        let out = feed_all(&mut assembler, b"\xff\xfe\nEnd\n");

        assert_eq!(out[0], Err(LineError::InvalidUtf8));
        assert_eq!(out[1].as_ref().unwrap().as_str(), "End");
    }
}
