//! Drive motor trait
//!
//! The state machines only ever ask for a signed drive level. How that maps
//! to PWM channels, enable lines or direction pins is up to the driver.

/// Full-scale drive level in percent of duty cycle
pub const MAX_DRIVE: i16 = 100;

/// Errors that can occur with motor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Driver is disabled (enable line low or fault latched)
    Disabled,
    /// PWM or GPIO write failed
    Hardware,
}

impl core::fmt::Display for MotorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotorError::Disabled => f.write_str("motor driver disabled"),
            MotorError::Hardware => f.write_str("motor driver write failed"),
        }
    }
}

/// A motor driven by a signed duty cycle
pub trait DriveMotor {
    /// Apply a drive level in percent, `-MAX_DRIVE..=MAX_DRIVE`
    ///
    /// Positive values turn the motor forward, negative values reverse it and
    /// zero stops it. Implementations clamp out-of-range values.
    fn set_drive(&mut self, command: i16) -> Result<(), MotorError>;

    /// Stop the motor
    fn stop(&mut self) -> Result<(), MotorError> {
        self.set_drive(0)
    }
}

impl<T: DriveMotor + ?Sized> DriveMotor for &mut T {
    fn set_drive(&mut self, command: i16) -> Result<(), MotorError> {
        (**self).set_drive(command)
    }
}
