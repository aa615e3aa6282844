//! Digital input trait
//!
//! Inputs are exposed as "active or not". Electrical polarity (pull-ups,
//! active-low switches) is resolved by the driver, so the state machines
//! never reason about voltage levels.

/// Errors that can occur reading an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Pin could not be read
    Hardware,
}

impl core::fmt::Display for InputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("input read failed")
    }
}

/// A boolean sensor or switch
pub trait DigitalInput {
    /// Whether the input is currently asserted
    fn is_active(&mut self) -> Result<bool, InputError>;
}

impl<T: DigitalInput + ?Sized> DigitalInput for &mut T {
    fn is_active(&mut self) -> Result<bool, InputError> {
        (**self).is_active()
    }
}
