//! Actuator trigger states

use crate::traits::{InputError, MotorError};

/// Actuator trigger states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerState {
    /// Actuator not yet brought to rest
    #[default]
    Init,
    /// Waiting for the trigger input
    Armed,
    /// Driving forward until the limit is reached
    Extending,
    /// At the limit; driving forward while it stays reached
    Holding,
}

/// Faults reported by the trigger machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerFault {
    /// Trigger or limit input could not be read
    Input(InputError),
    /// Actuator drive failed
    Drive(MotorError),
}

impl From<InputError> for TriggerFault {
    fn from(e: InputError) -> Self {
        TriggerFault::Input(e)
    }
}

impl From<MotorError> for TriggerFault {
    fn from(e: MotorError) -> Self {
        TriggerFault::Drive(e)
    }
}

/// What a single trigger step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerOutcome {
    /// State unchanged
    Stayed,
    /// Moved into a new state
    Entered(TriggerState),
    /// A fault stopped the actuator; machine is back in `Armed`
    Fault(TriggerFault),
}
