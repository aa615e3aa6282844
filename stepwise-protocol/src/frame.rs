//! Line frames for the device → host dataset stream
//!
//! Stream layout:
//! - zero or more diagnostic lines (free text)
//! - `Start Data Transfer`
//! - header: `<x label>,<y label>`
//! - zero or more data lines: `<x>,<y>` (spaces also separate fields)
//! - `End`

use core::fmt::Write;

use heapless::String;

/// Sentinel line opening a dataset
pub const START_MARKER: &str = "Start Data Transfer";

/// Sentinel line closing a dataset
pub const END_MARKER: &str = "End";

/// Host to device: abandon any run and stop the motor
pub const STOP_COMMAND: &str = "!stop";

/// Maximum line length in bytes, terminator excluded
pub const MAX_LINE_LEN: usize = 96;

/// Errors when building or classifying a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Rendered line does not fit in [`MAX_LINE_LEN`]
    LineTooLong,
    /// Text contains a line break or collides with a sentinel
    InvalidText,
    /// Data line has fewer than two fields
    MissingField,
    /// A data field is not a number
    BadNumber,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            FrameError::LineTooLong => "line too long",
            FrameError::InvalidText => "text not allowed in a frame",
            FrameError::MissingField => "expected two fields",
            FrameError::BadNumber => "field is not a number",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// Errors when writing frames to a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError<E> {
    /// The frame itself could not be rendered
    Frame(FrameError),
    /// The underlying writer failed
    Link(E),
}

impl<E> From<FrameError> for EncodeError<E> {
    fn from(e: FrameError) -> Self {
        EncodeError::Frame(e)
    }
}

/// Sink for complete protocol lines
///
/// Implementations append the `\n` terminator themselves.
pub trait LineWriter {
    /// Error type of the underlying link
    type Error;

    /// Write one line followed by a terminator
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

impl<T: LineWriter + ?Sized> LineWriter for &mut T {
    type Error = T::Error;

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        (**self).write_line(line)
    }
}

/// One line of the dataset stream
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolFrame<'a> {
    /// Free text, logged by the receiver
    Diagnostic(&'a str),
    /// `Start Data Transfer`
    StartMarker,
    /// Axis labels
    Header(&'a str, &'a str),
    /// One `(x, y)` point
    DataLine(f64, f64),
    /// `End`
    EndMarker,
}

impl<'a> ProtocolFrame<'a> {
    /// Render this frame as a line without terminator
    pub fn render(&self) -> Result<String<MAX_LINE_LEN>, FrameError> {
        let mut line = String::new();
        match self {
            ProtocolFrame::Diagnostic(text) => {
                check_text(text)?;
                if text.trim() == START_MARKER {
                    return Err(FrameError::InvalidText);
                }
                line.push_str(text).map_err(|_| FrameError::LineTooLong)?;
            }
            ProtocolFrame::StartMarker => {
                line.push_str(START_MARKER)
                    .map_err(|_| FrameError::LineTooLong)?;
            }
            ProtocolFrame::Header(x_label, y_label) => {
                check_text(x_label)?;
                check_text(y_label)?;
                if x_label.contains(',') {
                    return Err(FrameError::InvalidText);
                }
                write!(line, "{},{}", x_label, y_label).map_err(|_| FrameError::LineTooLong)?;
            }
            ProtocolFrame::DataLine(x, y) => {
                write!(line, "{},{}", x, y).map_err(|_| FrameError::LineTooLong)?;
            }
            ProtocolFrame::EndMarker => {
                line.push_str(END_MARKER)
                    .map_err(|_| FrameError::LineTooLong)?;
            }
        }
        Ok(line)
    }

    /// Render and write this frame
    pub fn write_to<W: LineWriter>(&self, writer: &mut W) -> Result<(), EncodeError<W::Error>> {
        let line = self.render()?;
        writer.write_line(&line).map_err(EncodeError::Link)
    }
}

fn check_text(text: &str) -> Result<(), FrameError> {
    if text.contains(['\n', '\r']) {
        return Err(FrameError::InvalidText);
    }
    Ok(())
}

/// Write a complete dataset: start marker, header, points, end marker
pub fn write_dataset<W, I>(
    writer: &mut W,
    labels: (&str, &str),
    points: I,
) -> Result<usize, EncodeError<W::Error>>
where
    W: LineWriter,
    I: IntoIterator<Item = (f64, f64)>,
{
    ProtocolFrame::StartMarker.write_to(writer)?;
    ProtocolFrame::Header(labels.0, labels.1).write_to(writer)?;

    let mut count = 0;
    for (x, y) in points {
        ProtocolFrame::DataLine(x, y).write_to(writer)?;
        count += 1;
    }

    ProtocolFrame::EndMarker.write_to(writer)?;
    Ok(count)
}

/// Split a header line into its two labels
///
/// Splits on commas and keeps the first two fields, trimmed. Extra fields
/// are ignored. A header without a comma yields the whole line as the x
/// label and an empty y label.
pub fn parse_header(line: &str) -> (&str, &str) {
    let mut fields = line.split(',').map(str::trim);
    let x_label = fields.next().unwrap_or("");
    let y_label = fields.next().unwrap_or("");
    (x_label, y_label)
}

/// Parse a data line into `(x, y)`
///
/// Spaces count as commas, then the line is split on commas and the first
/// two fields are parsed. Trailing fields are ignored. Note that `10, 5`
/// therefore has an empty second field and is rejected.
pub fn parse_data_line(line: &str) -> Result<(f64, f64), FrameError> {
    let mut fields = line.split([' ', ',']);
    let x = fields.next().ok_or(FrameError::MissingField)?;
    let y = fields.next().ok_or(FrameError::MissingField)?;

    let x: f64 = x.parse().map_err(|_| FrameError::BadNumber)?;
    let y: f64 = y.parse().map_err(|_| FrameError::BadNumber)?;
    Ok((x, y))
}
