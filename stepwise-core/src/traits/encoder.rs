//! Position encoder trait

/// Errors that can occur reading the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderError {
    /// Counter peripheral could not be read
    Hardware,
}

impl core::fmt::Display for EncoderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("encoder read failed")
    }
}

/// An incremental position sensor with a software zero
pub trait PositionEncoder {
    /// Current position in encoder ticks relative to the last zero
    fn read_position(&mut self) -> Result<i32, EncoderError>;

    /// Make the current position the new zero
    fn zero(&mut self) -> Result<(), EncoderError>;
}

impl<T: PositionEncoder + ?Sized> PositionEncoder for &mut T {
    fn read_position(&mut self) -> Result<i32, EncoderError> {
        (**self).read_position()
    }

    fn zero(&mut self) -> Result<(), EncoderError> {
        (**self).zero()
    }
}
