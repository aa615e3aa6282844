//! Gain command encoding and parsing
//!
//! A run is started by a single line holding the proportional gain in plain
//! decimal form. The encoder always produces text matching
//! `^-?[0-9]+(\.[0-9]+)?\n$`; the parser is more lenient and accepts any
//! surrounding whitespace.

use core::fmt::Write;

use heapless::String;

/// Maximum encoded gain line length, terminator included
///
/// `f32::MAX` prints as 39 digits, so this leaves room to spare.
pub const MAX_GAIN_LINE: usize = 48;

/// Reasons a gain line is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GainError {
    /// Line was empty or whitespace only
    Empty,
    /// Line is not a decimal number
    NotNumeric,
    /// Gain is below zero
    Negative,
    /// Gain is NaN or infinite
    NotFinite,
    /// Encoded form does not fit the line buffer
    TooLong,
}

impl core::fmt::Display for GainError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            GainError::Empty => "empty gain line",
            GainError::NotNumeric => "gain is not a number",
            GainError::Negative => "gain must not be negative",
            GainError::NotFinite => "gain must be finite",
            GainError::TooLong => "gain line too long",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GainError {}

/// A validated proportional gain
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GainCommand {
    gain: f32,
}

impl GainCommand {
    /// Validate a gain value
    pub fn new(gain: f32) -> Result<Self, GainError> {
        if !gain.is_finite() {
            return Err(GainError::NotFinite);
        }
        if gain < 0.0 {
            return Err(GainError::Negative);
        }
        // Fold -0.0 into 0.0 so the encoded line never carries a sign
        let gain = if gain == 0.0 { 0.0 } else { gain };
        Ok(Self { gain })
    }

    /// Parse a received command line
    pub fn parse(line: &str) -> Result<Self, GainError> {
        let text = line.trim();
        if text.is_empty() {
            return Err(GainError::Empty);
        }
        let gain: f32 = text.parse().map_err(|_| GainError::NotNumeric)?;
        Self::new(gain)
    }

    /// The gain value
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Encode as a newline-terminated command line
    pub fn encode(&self) -> Result<String<MAX_GAIN_LINE>, GainError> {
        let mut line = String::new();
        writeln!(line, "{}", self.gain).map_err(|_| GainError::TooLong)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Check the command line grammar without pulling in a regex engine
    fn matches_command_grammar(line: &str) -> bool {
        let Some(body) = line.strip_suffix('\n') else {
            return false;
        };
        let body = body.strip_prefix('-').unwrap_or(body);
        let (int, frac) = match body.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (body, None),
        };
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        digits(int) && frac.map_or(true, digits)
    }

    #[test]
    fn test_parse_plain_values() {
        assert_eq!(GainCommand::parse("2.5\n").unwrap().gain(), 2.5);
        assert_eq!(GainCommand::parse("  3 \r\n").unwrap().gain(), 3.0);
        assert_eq!(GainCommand::parse("0").unwrap().gain(), 0.0);
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(GainCommand::parse(""), Err(GainError::Empty));
        assert_eq!(GainCommand::parse(" \n"), Err(GainError::Empty));
        assert_eq!(GainCommand::parse("abc"), Err(GainError::NotNumeric));
        assert_eq!(GainCommand::parse("-1.5"), Err(GainError::Negative));
        assert_eq!(GainCommand::parse("inf"), Err(GainError::NotFinite));
        assert_eq!(GainCommand::parse("NaN"), Err(GainError::NotFinite));
    }

    #[test]
    fn test_encode_matches_grammar() {
        for gain in [0.0f32, 2.5, 3.0, 0.125, 1200.75, 0.0000001, f32::MAX] {
            let line = GainCommand::new(gain).unwrap().encode().unwrap();
            assert!(matches_command_grammar(&line), "bad line {:?}", line.as_str());
        }
    }

    #[test]
    fn test_negative_zero_is_unsigned() {
        let line = GainCommand::new(-0.0).unwrap().encode().unwrap();
        assert_eq!(line.as_str(), "0\n");
    }

    #[test]
    fn test_encode_then_parse_keeps_value() {
        let original = GainCommand::new(2.5).unwrap();
        let line = original.encode().unwrap();
        assert_eq!(line.as_str(), "2.5\n");
        assert_eq!(GainCommand::parse(&line).unwrap(), original);
    }
}
