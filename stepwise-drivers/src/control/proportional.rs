//! Proportional position controller

use stepwise_core::traits::{ControlLaw, MAX_DRIVE};

/// `command = clamp(gain * (setpoint - position), -MAX_DRIVE, MAX_DRIVE)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProportionalController {
    gain: f32,
    setpoint: i32,
}

impl ProportionalController {
    pub fn new(gain: f32, setpoint: i32) -> Self {
        Self { gain, setpoint }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn setpoint(&self) -> i32 {
        self.setpoint
    }

    /// Position error in ticks
    pub fn error(&self, position: i32) -> i32 {
        self.setpoint.saturating_sub(position)
    }
}

impl ControlLaw for ProportionalController {
    fn with_gain(gain: f32, setpoint: i32) -> Self {
        Self::new(gain, setpoint)
    }

    fn command(&mut self, position: i32) -> i16 {
        let limit = MAX_DRIVE as f32;
        // Truncates toward zero; NaN maps to 0
        (self.gain * self.error(position) as f32).clamp(-limit, limit) as i16
    }
}
