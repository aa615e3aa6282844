//! H-bridge DC motor driver
//!
//! One enable line and two PWM legs. Positive drive modulates the forward
//! leg with the reverse leg held off; negative drive does the opposite.
//! Zero holds both legs off.
//!
//! ```ignore
//! let mut motor = HBridgeMotor::new(enable, pwm_a, pwm_b)?;
//! motor.set_drive(-40)?; // 40% reverse
//! motor.stop()?;
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use stepwise_core::traits::{DriveMotor, MotorError, MAX_DRIVE};

/// DC motor behind an H-bridge
pub struct HBridgeMotor<EN, IN1, IN2> {
    enable: EN,
    forward: IN1,
    reverse: IN2,
    enabled: bool,
    /// Last applied drive level
    drive: i16,
}

impl<EN, IN1, IN2> HBridgeMotor<EN, IN1, IN2>
where
    EN: OutputPin,
    IN1: SetDutyCycle,
    IN2: SetDutyCycle,
{
    /// Take the pins, stop both legs and enable the bridge
    pub fn new(enable: EN, forward: IN1, reverse: IN2) -> Result<Self, MotorError> {
        let mut motor = Self {
            enable,
            forward,
            reverse,
            enabled: false,
            drive: 0,
        };
        motor.legs_off()?;
        motor.enable.set_high().map_err(|_| MotorError::Hardware)?;
        motor.enabled = true;
        Ok(motor)
    }

    /// Last applied drive level
    pub fn drive(&self) -> i16 {
        self.drive
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stop and pull the enable line low
    ///
    /// Further non-zero drive requests fail with `MotorError::Disabled`.
    pub fn disable(&mut self) -> Result<(), MotorError> {
        self.legs_off()?;
        self.enabled = false;
        self.enable.set_low().map_err(|_| MotorError::Hardware)
    }

    /// Stop the motor and give back the pins
    pub fn release(mut self) -> (EN, IN1, IN2) {
        // Best effort: the pins are handed back either way
        let _ = self.disable();
        (self.enable, self.forward, self.reverse)
    }

    fn legs_off(&mut self) -> Result<(), MotorError> {
        leg_off(&mut self.forward)?;
        leg_off(&mut self.reverse)?;
        self.drive = 0;
        Ok(())
    }
}

impl<EN, IN1, IN2> DriveMotor for HBridgeMotor<EN, IN1, IN2>
where
    EN: OutputPin,
    IN1: SetDutyCycle,
    IN2: SetDutyCycle,
{
    fn set_drive(&mut self, command: i16) -> Result<(), MotorError> {
        let command = command.clamp(-MAX_DRIVE, MAX_DRIVE);
        if command == 0 {
            return self.legs_off();
        }
        if !self.enabled {
            return Err(MotorError::Disabled);
        }

        let percent = command.unsigned_abs() as u8;
        if command > 0 {
            leg_off(&mut self.reverse)?;
            leg_percent(&mut self.forward, percent)?;
        } else {
            leg_off(&mut self.forward)?;
            leg_percent(&mut self.reverse, percent)?;
        }
        self.drive = command;
        Ok(())
    }
}

fn leg_off<P: SetDutyCycle>(leg: &mut P) -> Result<(), MotorError> {
    leg.set_duty_cycle_fully_off()
        .map_err(|_| MotorError::Hardware)
}

fn leg_percent<P: SetDutyCycle>(leg: &mut P, percent: u8) -> Result<(), MotorError> {
    leg.set_duty_cycle_percent(percent)
        .map_err(|_| MotorError::Hardware)
}
