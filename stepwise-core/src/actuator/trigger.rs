//! Actuator trigger state machine
//!
//! Extends the actuator when the trigger input becomes active, holds it
//! while the limit input reports reached and retracts to rest when the limit
//! clears. Level-triggered and debounce-free.

use crate::config::TriggerConfig;
use crate::state::{TriggerFault, TriggerOutcome, TriggerState};
use crate::traits::{DigitalInput, DriveMotor, MotorError};

/// Level-triggered actuator gated by a limit input
pub struct ActuatorTrigger<A, T, L> {
    actuator: A,
    trigger: T,
    limit: L,
    config: TriggerConfig,
    state: TriggerState,
}

impl<A, T, L> ActuatorTrigger<A, T, L>
where
    A: DriveMotor,
    T: DigitalInput,
    L: DigitalInput,
{
    /// Create a machine in `Init`
    pub fn new(actuator: A, trigger: T, limit: L, config: TriggerConfig) -> Self {
        Self {
            actuator,
            trigger,
            limit,
            config,
            state: TriggerState::Init,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Advance the machine by one scheduling period
    pub fn step(&mut self) -> TriggerOutcome {
        match self.transition() {
            Ok(next) if next == self.state => TriggerOutcome::Stayed,
            Ok(next) => {
                self.state = next;
                TriggerOutcome::Entered(next)
            }
            Err(fault) => {
                let _ = self.actuator.stop();
                self.state = TriggerState::Armed;
                TriggerOutcome::Fault(fault)
            }
        }
    }

    /// Stop the actuator and re-arm
    pub fn shutdown(&mut self) -> Result<(), MotorError> {
        self.state = TriggerState::Armed;
        self.actuator.stop()
    }

    fn transition(&mut self) -> Result<TriggerState, TriggerFault> {
        let next = match self.state {
            TriggerState::Init => {
                self.actuator.stop()?;
                TriggerState::Armed
            }
            TriggerState::Armed => {
                if self.trigger.is_active()? {
                    TriggerState::Extending
                } else {
                    TriggerState::Armed
                }
            }
            TriggerState::Extending => {
                self.actuator.set_drive(self.config.extend_drive)?;
                if self.limit.is_active()? {
                    TriggerState::Holding
                } else {
                    TriggerState::Extending
                }
            }
            TriggerState::Holding => {
                if self.limit.is_active()? {
                    self.actuator.set_drive(self.config.extend_drive)?;
                    TriggerState::Holding
                } else {
                    self.actuator.stop()?;
                    TriggerState::Armed
                }
            }
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::InputError;
    use core::cell::Cell;

    #[derive(Default)]
    struct FakeActuator {
        drive: i16,
        fail: bool,
    }

    impl DriveMotor for FakeActuator {
        fn set_drive(&mut self, command: i16) -> Result<(), MotorError> {
            if self.fail {
                return Err(MotorError::Hardware);
            }
            self.drive = command;
            Ok(())
        }
    }

    /// Input whose level the test flips between steps
    struct Level<'a>(&'a Cell<Option<bool>>);

    impl DigitalInput for Level<'_> {
        fn is_active(&mut self) -> Result<bool, InputError> {
            self.0.get().ok_or(InputError::Hardware)
        }
    }

    #[test]
    fn test_init_stops_and_arms() {
        let trigger = Cell::new(Some(false));
        let limit = Cell::new(Some(false));
        let mut actuator = FakeActuator {
            drive: 55,
            ..Default::default()
        };
        let mut machine = ActuatorTrigger::new(
            &mut actuator,
            Level(&trigger),
            Level(&limit),
            TriggerConfig::default(),
        );

        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Armed));
        assert_eq!(machine.step(), TriggerOutcome::Stayed);
        drop(machine);
        assert_eq!(actuator.drive, 0);
    }

    #[test]
    fn test_extend_hold_retract_cycle() {
        let trigger = Cell::new(Some(false));
        let limit = Cell::new(Some(false));
        let mut actuator = FakeActuator::default();
        let mut machine = ActuatorTrigger::new(
            &mut actuator,
            Level(&trigger),
            Level(&limit),
            TriggerConfig::default(),
        );
        machine.step();
        assert_eq!(machine.state(), TriggerState::Armed);

        trigger.set(Some(true));
        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Extending));

        // Drives forward until the limit is reached
        assert_eq!(machine.step(), TriggerOutcome::Stayed);
        limit.set(Some(true));
        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Holding));
        assert_eq!(machine.step(), TriggerOutcome::Stayed);

        limit.set(Some(false));
        trigger.set(Some(false));
        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Armed));
        drop(machine);
        assert_eq!(actuator.drive, 0);
    }

    #[test]
    fn test_held_trigger_re_extends_without_new_edge() {
        let trigger = Cell::new(Some(true));
        let limit = Cell::new(Some(false));
        let mut actuator = FakeActuator::default();
        let mut machine = ActuatorTrigger::new(
            &mut actuator,
            Level(&trigger),
            Level(&limit),
            TriggerConfig::default(),
        );
        machine.step();
        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Extending));
        limit.set(Some(true));
        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Holding));

        // Trigger never released: clearing the limit re-arms and the still
        // active level starts another extension straight away
        limit.set(Some(false));
        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Armed));
        assert_eq!(machine.step(), TriggerOutcome::Entered(TriggerState::Extending));
    }

    #[test]
    fn test_holding_keeps_driving() {
        let trigger = Cell::new(Some(true));
        let limit = Cell::new(Some(true));
        let mut actuator = FakeActuator::default();
        let config = TriggerConfig {
            extend_drive: 60,
            ..Default::default()
        };
        let mut machine = ActuatorTrigger::new(
            &mut actuator,
            Level(&trigger),
            Level(&limit),
            config,
        );
        for _ in 0..3 {
            machine.step();
        }
        assert_eq!(machine.state(), TriggerState::Holding);
        machine.step();
        drop(machine);
        assert_eq!(actuator.drive, 60);
    }

    #[test]
    fn test_input_fault_stops_and_rearms() {
        let trigger = Cell::new(Some(true));
        let limit = Cell::new(None);
        let mut actuator = FakeActuator::default();
        let mut machine = ActuatorTrigger::new(
            &mut actuator,
            Level(&trigger),
            Level(&limit),
            TriggerConfig::default(),
        );
        machine.step();
        machine.step();
        assert_eq!(machine.state(), TriggerState::Extending);

        assert_eq!(
            machine.step(),
            TriggerOutcome::Fault(TriggerFault::Input(InputError::Hardware))
        );
        assert_eq!(machine.state(), TriggerState::Armed);
        drop(machine);
        assert_eq!(actuator.drive, 0);
    }

    #[test]
    fn test_drive_fault_on_init() {
        let trigger = Cell::new(Some(false));
        let limit = Cell::new(Some(false));
        let mut actuator = FakeActuator {
            fail: true,
            ..Default::default()
        };
        let mut machine = ActuatorTrigger::new(
            &mut actuator,
            Level(&trigger),
            Level(&limit),
            TriggerConfig::default(),
        );

        assert_eq!(
            machine.step(),
            TriggerOutcome::Fault(TriggerFault::Drive(MotorError::Hardware))
        );
    }

    #[test]
    fn test_shutdown_mid_extend() {
        let trigger = Cell::new(Some(true));
        let limit = Cell::new(Some(false));
        let mut actuator = FakeActuator::default();
        let mut machine = ActuatorTrigger::new(
            &mut actuator,
            Level(&trigger),
            Level(&limit),
            TriggerConfig::default(),
        );
        machine.step();
        machine.step();
        machine.step();

        assert_eq!(machine.shutdown(), Ok(()));
        assert_eq!(machine.state(), TriggerState::Armed);
        drop(machine);
        assert_eq!(actuator.drive, 0);
    }
}
