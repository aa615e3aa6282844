//! Dataset stream decoder
//!
//! Classifies each received line by its position in the stream and reports
//! what it meant. The decoder stores nothing beyond its state and counters;
//! the caller accumulates points.
//!
//! ```text
//!  WaitStart ──"Start Data Transfer"──▶ ReadHeader ──any line──▶ ReadData
//!      ▲  └─ other lines: Diagnostic                               │
//!      └──────────────────────────"End"─────────────────────────────┘
//! ```

use crate::frame::{
    parse_data_line, parse_header, FrameError, ProtocolFrame, END_MARKER, START_MARKER,
};

/// Decoder position in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeState {
    /// Waiting for the start marker; other lines are diagnostics
    #[default]
    WaitStart,
    /// Next line is the header
    ReadHeader,
    /// Reading data lines until the end marker
    ReadData,
}

/// Result of feeding one line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeEvent<'a> {
    /// Text received before the start marker
    Diagnostic(&'a str),
    /// Start marker seen
    Started,
    /// Axis labels received
    Header {
        x_label: &'a str,
        y_label: &'a str,
    },
    /// A data point
    Point { x: f64, y: f64 },
    /// A data line that could not be parsed; decoding continues
    Skipped { line: &'a str, error: FrameError },
    /// End marker seen; the decoder is back in `WaitStart`
    Finished,
}

/// Forward-only decoder for the dataset stream
#[derive(Debug, Clone, Default)]
pub struct StreamDecoder {
    state: DecodeState,
    points: usize,
    skipped: usize,
}

impl StreamDecoder {
    /// Create a decoder waiting for a start marker
    pub const fn new() -> Self {
        Self {
            state: DecodeState::WaitStart,
            points: 0,
            skipped: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Points decoded in the current (or last finished) dataset
    pub fn points(&self) -> usize {
        self.points
    }

    /// Data lines skipped in the current (or last finished) dataset
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Return to `WaitStart`, abandoning any dataset in progress
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Classify a line according to the current state
    ///
    /// The line is trimmed first. Only lines in `ReadData` can fail.
    pub fn classify<'a>(&self, line: &'a str) -> Result<ProtocolFrame<'a>, FrameError> {
        let line = line.trim();
        match self.state {
            DecodeState::WaitStart if line == START_MARKER => Ok(ProtocolFrame::StartMarker),
            DecodeState::WaitStart => Ok(ProtocolFrame::Diagnostic(line)),
            DecodeState::ReadHeader => {
                let (x_label, y_label) = parse_header(line);
                Ok(ProtocolFrame::Header(x_label, y_label))
            }
            DecodeState::ReadData if line == END_MARKER => Ok(ProtocolFrame::EndMarker),
            DecodeState::ReadData => {
                let (x, y) = parse_data_line(line)?;
                Ok(ProtocolFrame::DataLine(x, y))
            }
        }
    }

    /// Account for a line that was lost before it could be classified
    ///
    /// The lost line still occupies its slot: a lost header leaves the
    /// labels empty and moves on to `ReadData`, a lost data line counts as
    /// skipped. Outside a dataset nothing changes.
    pub fn skip_line(&mut self) {
        match self.state {
            DecodeState::WaitStart => {}
            DecodeState::ReadHeader => self.state = DecodeState::ReadData,
            DecodeState::ReadData => self.skipped += 1,
        }
    }

    /// Feed one complete line and advance
    pub fn push_line<'a>(&mut self, line: &'a str) -> DecodeEvent<'a> {
        let frame = match self.classify(line) {
            Ok(frame) => frame,
            Err(error) => {
                self.skipped += 1;
                return DecodeEvent::Skipped {
                    line: line.trim(),
                    error,
                };
            }
        };

        match frame {
            ProtocolFrame::Diagnostic(text) => DecodeEvent::Diagnostic(text),
            ProtocolFrame::StartMarker => {
                self.state = DecodeState::ReadHeader;
                self.points = 0;
                self.skipped = 0;
                DecodeEvent::Started
            }
            ProtocolFrame::Header(x_label, y_label) => {
                self.state = DecodeState::ReadData;
                DecodeEvent::Header { x_label, y_label }
            }
            ProtocolFrame::DataLine(x, y) => {
                self.points += 1;
                DecodeEvent::Point { x, y }
            }
            ProtocolFrame::EndMarker => {
                self.state = DecodeState::WaitStart;
                DecodeEvent::Finished
            }
        }
    }
}
