//! Polarity-aware input pin
//!
//! Resolves the electrical convention of a switch or sensor so the state
//! machines only see "active".

use embedded_hal::digital::InputPin;
use stepwise_core::traits::{DigitalInput, InputError};

/// Which pin level means "active"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Asserted when low (switch to ground with pull-up)
    #[default]
    ActiveLow,
    /// Asserted when high
    ActiveHigh,
}

/// An `embedded-hal` input pin with a fixed polarity
pub struct PolarityInput<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: InputPin> PolarityInput<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    pub fn active_low(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveLow)
    }

    pub fn active_high(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveHigh)
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}

impl<P: InputPin> DigitalInput for PolarityInput<P> {
    fn is_active(&mut self) -> Result<bool, InputError> {
        let level = match self.polarity {
            Polarity::ActiveLow => self.pin.is_low(),
            Polarity::ActiveHigh => self.pin.is_high(),
        };
        level.map_err(|_| InputError::Hardware)
    }
}
