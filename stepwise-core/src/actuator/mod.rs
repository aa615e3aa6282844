//! Secondary actuator

pub mod trigger;

pub use trigger::ActuatorTrigger;
