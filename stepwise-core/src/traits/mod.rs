//! Hardware abstraction traits
//!
//! These traits define the narrow interface between the state machines and
//! hardware-specific implementations.

pub mod control;
pub mod encoder;
pub mod input;
pub mod motor;

pub use control::ControlLaw;
pub use encoder::{EncoderError, PositionEncoder};
pub use input::{DigitalInput, InputError};
pub use motor::{DriveMotor, MotorError, MAX_DRIVE};
